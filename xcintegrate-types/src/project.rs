//! In-memory model of the user's project graph.
//!
//! Only the parts the integrator reads or mutates are modelled: native targets with their
//! ordered build phases, and the shared "Frameworks" group holding product references.
//! Every other key is carried through untouched in the `extra` map of the owning object.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Object identifier as used by the project file format: 24 upper-case hex characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    const NAMESPACE: Uuid = Uuid::from_u128(0x6f1b_3c52_9a0e_4d8b_b7c4_2e95_a1d0_7f33);

    /// Derive an id from a seed. The same seed always yields the same id, so snapshots
    /// produced by independent runs over identical input are byte-identical.
    pub fn derive(seed: &str) -> Self {
        let uuid = Uuid::new_v5(&Self::NAMESPACE, seed.as_bytes());
        let hex = uuid.simple().to_string().to_ascii_uppercase();
        Self(hex[..24].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default = "default_project_schema")]
    pub schema: String,

    pub name: String,

    #[serde(default = "Group::frameworks")]
    pub frameworks_group: Group,

    #[serde(default)]
    pub targets: Vec<NativeTarget>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_project_schema() -> String {
    crate::schema::XCINTEGRATE_PROJECT_V1.to_string()
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: default_project_schema(),
            name: name.into(),
            frameworks_group: Group::frameworks(),
            targets: vec![],
            extra: BTreeMap::new(),
        }
    }

    pub fn native_target(&self, name: &str) -> Option<&NativeTarget> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn native_target_mut(&mut self, name: &str) -> Option<&mut NativeTarget> {
        self.targets.iter_mut().find(|t| t.name == name)
    }
}

/// A group of file references. The integrator only touches the project's frameworks group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,

    #[serde(default)]
    pub children: Vec<FileReference>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Group {
    pub fn frameworks() -> Self {
        Self {
            name: "Frameworks".to_string(),
            children: vec![],
            extra: BTreeMap::new(),
        }
    }

    pub fn file_by_path(&self, path: &str) -> Option<&FileReference> {
        self.children.iter().find(|f| f.path == path)
    }

    /// Remove a reference by id. Returns the removed reference, if any.
    pub fn remove_reference(&mut self, id: &ObjectId) -> Option<FileReference> {
        let idx = self.children.iter().position(|f| &f.id == id)?;
        Some(self.children.remove(idx))
    }

    /// Create a product reference for `basename` under the given product kind and add it to
    /// the group. Returns the new reference's id.
    pub fn new_product_ref(&mut self, basename: &str, kind: ProductKind) -> ObjectId {
        let path = kind.product_name(basename);
        let file = FileReference {
            id: ObjectId::derive(&format!("product-ref:{path}")),
            path,
            explicit_file_type: Some(kind.explicit_file_type().to_string()),
            source_tree: "BUILT_PRODUCTS_DIR".to_string(),
            include_in_index: false,
            extra: BTreeMap::new(),
        };
        let id = file.id.clone();
        self.children.push(file);
        id
    }
}

/// Product flavour of a linked library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    StaticLibrary,
    Framework,
}

impl ProductKind {
    pub fn product_name(self, basename: &str) -> String {
        match self {
            ProductKind::StaticLibrary => format!("lib{basename}.a"),
            ProductKind::Framework => format!("{basename}.framework"),
        }
    }

    pub fn explicit_file_type(self) -> &'static str {
        match self {
            ProductKind::StaticLibrary => "archive.ar",
            ProductKind::Framework => "wrapper.framework",
        }
    }

    pub fn other(self) -> Self {
        match self {
            ProductKind::StaticLibrary => ProductKind::Framework,
            ProductKind::Framework => ProductKind::StaticLibrary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    pub id: ObjectId,
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_file_type: Option<String>,

    #[serde(default = "default_source_tree")]
    pub source_tree: String,

    #[serde(default = "default_true")]
    pub include_in_index: bool,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_source_tree() -> String {
    "<group>".to_string()
}

fn default_true() -> bool {
    true
}

/// Product type tag of a native target. Unrecognised tags keep their raw spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SymbolType {
    Application,
    Framework,
    DynamicLibrary,
    StaticLibrary,
    Bundle,
    UnitTestBundle,
    UiTestBundle,
    AppExtension,
    WatchApp,
    Watch2App,
    WatchExtension,
    Watch2Extension,
    MessagesApplication,
    MessagesExtension,
    StickerPack,
    XpcService,
    TvExtension,
    Other(String),
}

impl SymbolType {
    pub fn as_str(&self) -> &str {
        match self {
            SymbolType::Application => "application",
            SymbolType::Framework => "framework",
            SymbolType::DynamicLibrary => "dynamic_library",
            SymbolType::StaticLibrary => "static_library",
            SymbolType::Bundle => "bundle",
            SymbolType::UnitTestBundle => "unit_test_bundle",
            SymbolType::UiTestBundle => "ui_test_bundle",
            SymbolType::AppExtension => "app_extension",
            SymbolType::WatchApp => "watch_app",
            SymbolType::Watch2App => "watch2_app",
            SymbolType::WatchExtension => "watch_extension",
            SymbolType::Watch2Extension => "watch2_extension",
            SymbolType::MessagesApplication => "messages_application",
            SymbolType::MessagesExtension => "messages_extension",
            SymbolType::StickerPack => "sticker_pack",
            SymbolType::XpcService => "xpc_service",
            SymbolType::TvExtension => "tv_extension",
            SymbolType::Other(raw) => raw,
        }
    }

    /// Targets that copy embedded frameworks into their own bundle.
    pub fn embeds_frameworks(&self) -> bool {
        matches!(
            self,
            SymbolType::Application
                | SymbolType::UnitTestBundle
                | SymbolType::UiTestBundle
                | SymbolType::Watch2Extension
                | SymbolType::MessagesApplication
        )
    }

    /// Targets whose frameworks are embedded by a host target instead of by themselves.
    pub fn embeds_into_host(&self) -> bool {
        matches!(
            self,
            SymbolType::AppExtension
                | SymbolType::Framework
                | SymbolType::StaticLibrary
                | SymbolType::MessagesExtension
                | SymbolType::WatchExtension
                | SymbolType::XpcService
        )
    }
}

impl From<String> for SymbolType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "application" => SymbolType::Application,
            "framework" => SymbolType::Framework,
            "dynamic_library" => SymbolType::DynamicLibrary,
            "static_library" => SymbolType::StaticLibrary,
            "bundle" => SymbolType::Bundle,
            "unit_test_bundle" => SymbolType::UnitTestBundle,
            "ui_test_bundle" => SymbolType::UiTestBundle,
            "app_extension" => SymbolType::AppExtension,
            "watch_app" => SymbolType::WatchApp,
            "watch2_app" => SymbolType::Watch2App,
            "watch_extension" => SymbolType::WatchExtension,
            "watch2_extension" => SymbolType::Watch2Extension,
            "messages_application" => SymbolType::MessagesApplication,
            "messages_extension" => SymbolType::MessagesExtension,
            "sticker_pack" => SymbolType::StickerPack,
            "xpc_service" => SymbolType::XpcService,
            "tv_extension" => SymbolType::TvExtension,
            _ => SymbolType::Other(raw),
        }
    }
}

impl From<SymbolType> for String {
    fn from(symbol_type: SymbolType) -> Self {
        match symbol_type {
            SymbolType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeTarget {
    pub id: ObjectId,
    pub name: String,
    pub symbol_type: SymbolType,

    #[serde(default)]
    pub build_phases: Vec<BuildPhase>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl NativeTarget {
    pub fn new(name: impl Into<String>, symbol_type: SymbolType) -> Self {
        let name = name.into();
        Self {
            id: ObjectId::derive(&format!("native-target:{name}")),
            name,
            symbol_type,
            build_phases: vec![],
            extra: BTreeMap::new(),
        }
    }

    /// Index of the first phase with the given type tag.
    pub fn first_index_of(&self, isa: PhaseIsa) -> Option<usize> {
        self.build_phases.iter().position(|p| p.isa() == isa)
    }

    pub fn index_of(&self, id: &ObjectId) -> Option<usize> {
        self.build_phases.iter().position(|p| p.id() == id)
    }

    pub fn shell_script_phases(&self) -> impl Iterator<Item = &ShellScriptBuildPhase> {
        self.build_phases.iter().filter_map(BuildPhase::as_shell_script)
    }

    pub fn phase_names(&self) -> Vec<String> {
        self.build_phases
            .iter()
            .map(|p| p.name().unwrap_or(p.isa().display_name()).to_string())
            .collect()
    }

    /// The link phase, created and appended when the target has none.
    pub fn frameworks_build_phase_mut(&mut self) -> &mut FrameworksBuildPhase {
        let idx = match self.first_index_of(PhaseIsa::Frameworks) {
            Some(idx) => idx,
            None => {
                let id = ObjectId::derive(&format!("phase:{}:frameworks", self.name));
                self.build_phases
                    .push(BuildPhase::new(PhaseIsa::Frameworks, id, None));
                self.build_phases.len() - 1
            }
        };
        match &mut self.build_phases[idx] {
            BuildPhase::Frameworks(phase) => phase,
            _ => unreachable!("first_index_of returned a non-frameworks phase"),
        }
    }

    pub fn frameworks_build_phase(&self) -> Option<&FrameworksBuildPhase> {
        self.build_phases.iter().find_map(|p| match p {
            BuildPhase::Frameworks(phase) => Some(phase),
            _ => None,
        })
    }
}

/// Type tag of a build phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseIsa {
    #[serde(rename = "PBXShellScriptBuildPhase")]
    ShellScript,
    #[serde(rename = "PBXSourcesBuildPhase")]
    Sources,
    #[serde(rename = "PBXHeadersBuildPhase")]
    Headers,
    #[serde(rename = "PBXResourcesBuildPhase")]
    Resources,
    #[serde(rename = "PBXFrameworksBuildPhase")]
    Frameworks,
    #[serde(rename = "PBXCopyFilesBuildPhase")]
    CopyFiles,
}

impl PhaseIsa {
    pub fn display_name(self) -> &'static str {
        match self {
            PhaseIsa::ShellScript => "ShellScript",
            PhaseIsa::Sources => "Sources",
            PhaseIsa::Headers => "Headers",
            PhaseIsa::Resources => "Resources",
            PhaseIsa::Frameworks => "Frameworks",
            PhaseIsa::CopyFiles => "CopyFiles",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "isa")]
pub enum BuildPhase {
    #[serde(rename = "PBXShellScriptBuildPhase")]
    ShellScript(ShellScriptBuildPhase),
    #[serde(rename = "PBXSourcesBuildPhase")]
    Sources(PlainBuildPhase),
    #[serde(rename = "PBXHeadersBuildPhase")]
    Headers(PlainBuildPhase),
    #[serde(rename = "PBXResourcesBuildPhase")]
    Resources(PlainBuildPhase),
    #[serde(rename = "PBXFrameworksBuildPhase")]
    Frameworks(FrameworksBuildPhase),
    #[serde(rename = "PBXCopyFilesBuildPhase")]
    CopyFiles(PlainBuildPhase),
}

impl BuildPhase {
    pub fn new(isa: PhaseIsa, id: ObjectId, name: Option<String>) -> Self {
        match isa {
            PhaseIsa::ShellScript => BuildPhase::ShellScript(ShellScriptBuildPhase {
                name,
                ..ShellScriptBuildPhase::new(id)
            }),
            PhaseIsa::Sources => BuildPhase::Sources(PlainBuildPhase::new(id, name)),
            PhaseIsa::Headers => BuildPhase::Headers(PlainBuildPhase::new(id, name)),
            PhaseIsa::Resources => BuildPhase::Resources(PlainBuildPhase::new(id, name)),
            PhaseIsa::Frameworks => BuildPhase::Frameworks(FrameworksBuildPhase {
                id,
                name,
                files: vec![],
                extra: BTreeMap::new(),
            }),
            PhaseIsa::CopyFiles => BuildPhase::CopyFiles(PlainBuildPhase::new(id, name)),
        }
    }

    pub fn isa(&self) -> PhaseIsa {
        match self {
            BuildPhase::ShellScript(_) => PhaseIsa::ShellScript,
            BuildPhase::Sources(_) => PhaseIsa::Sources,
            BuildPhase::Headers(_) => PhaseIsa::Headers,
            BuildPhase::Resources(_) => PhaseIsa::Resources,
            BuildPhase::Frameworks(_) => PhaseIsa::Frameworks,
            BuildPhase::CopyFiles(_) => PhaseIsa::CopyFiles,
        }
    }

    pub fn id(&self) -> &ObjectId {
        match self {
            BuildPhase::ShellScript(p) => &p.id,
            BuildPhase::Frameworks(p) => &p.id,
            BuildPhase::Sources(p)
            | BuildPhase::Headers(p)
            | BuildPhase::Resources(p)
            | BuildPhase::CopyFiles(p) => &p.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            BuildPhase::ShellScript(p) => p.name.as_deref(),
            BuildPhase::Frameworks(p) => p.name.as_deref(),
            BuildPhase::Sources(p)
            | BuildPhase::Headers(p)
            | BuildPhase::Resources(p)
            | BuildPhase::CopyFiles(p) => p.name.as_deref(),
        }
    }

    pub fn set_name(&mut self, name: &str) {
        let slot = match self {
            BuildPhase::ShellScript(p) => &mut p.name,
            BuildPhase::Frameworks(p) => &mut p.name,
            BuildPhase::Sources(p)
            | BuildPhase::Headers(p)
            | BuildPhase::Resources(p)
            | BuildPhase::CopyFiles(p) => &mut p.name,
        };
        if slot.as_deref() != Some(name) {
            *slot = Some(name.to_string());
        }
    }

    pub fn as_shell_script(&self) -> Option<&ShellScriptBuildPhase> {
        match self {
            BuildPhase::ShellScript(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_shell_script_mut(&mut self) -> Option<&mut ShellScriptBuildPhase> {
        match self {
            BuildPhase::ShellScript(p) => Some(p),
            _ => None,
        }
    }
}

/// A phase whose contents the integrator never inspects. Its file list and settings live in
/// `extra`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainBuildPhase {
    pub id: ObjectId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PlainBuildPhase {
    pub fn new(id: ObjectId, name: Option<String>) -> Self {
        Self {
            id,
            name,
            extra: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellScriptBuildPhase {
    pub id: ObjectId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default = "default_shell_path")]
    pub shell_path: String,

    #[serde(default)]
    pub shell_script: String,

    #[serde(default)]
    pub input_paths: Vec<String>,

    #[serde(default)]
    pub output_paths: Vec<String>,

    #[serde(default)]
    pub input_file_list_paths: Vec<String>,

    #[serde(default)]
    pub output_file_list_paths: Vec<String>,

    #[serde(default = "default_true")]
    pub show_env_vars_in_log: bool,

    #[serde(default)]
    pub always_out_of_date: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_file: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_shell_path() -> String {
    "/bin/sh".to_string()
}

impl ShellScriptBuildPhase {
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            name: None,
            shell_path: default_shell_path(),
            shell_script: String::new(),
            input_paths: vec![],
            output_paths: vec![],
            input_file_list_paths: vec![],
            output_file_list_paths: vec![],
            show_env_vars_in_log: true,
            always_out_of_date: false,
            dependency_file: None,
            extra: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworksBuildPhase {
    pub id: ObjectId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub files: Vec<BuildFile>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FrameworksBuildPhase {
    pub fn build_file(&self, file_ref: &ObjectId) -> Option<&BuildFile> {
        self.files.iter().find(|f| &f.file_ref == file_ref)
    }

    /// Link `file_ref` unless it is already linked. Returns true when a build file was added.
    pub fn add_file_reference(&mut self, file_ref: &ObjectId) -> bool {
        if self.build_file(file_ref).is_some() {
            return false;
        }
        self.files.push(BuildFile {
            id: ObjectId::derive(&format!("build-file:{}:{}", self.id, file_ref)),
            file_ref: file_ref.clone(),
            extra: BTreeMap::new(),
        });
        true
    }

    /// Unlink every build file pointing at `file_ref`. Returns the number removed.
    pub fn remove_file_reference(&mut self, file_ref: &ObjectId) -> usize {
        let before = self.files.len();
        self.files.retain(|f| &f.file_ref != file_ref);
        before - self.files.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFile {
    pub id: ObjectId,
    pub file_ref: ObjectId,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
