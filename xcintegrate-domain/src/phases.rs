//! Find-or-create and removal of named build phases.
//!
//! Phases are identified by name suffix, not by id: a phase belongs to us when its name ends
//! with a known logical name. Matching on the suffix lets phases created under an older prefix
//! convention be found and renamed in place instead of duplicated.

use crate::constants::USER_BUILD_PHASE_PREFIX;
use crate::events::EventSink;
use xcintegrate_types::events::IntegrationEvent;
use xcintegrate_types::project::{
    BuildPhase, NativeTarget, ObjectId, PhaseIsa, ShellScriptBuildPhase,
};

/// Whether `name` is claimed by a lookup for `suffix` on behalf of `full_name`.
///
/// User phases and built-in phases live in separate namespaces, so a user phase that happens
/// to end with a built-in logical name is never captured by the built-in lookup (and the
/// other way around).
fn claims(name: &str, suffix: &str, full_name: &str) -> bool {
    name.ends_with(suffix)
        && name.starts_with(USER_BUILD_PHASE_PREFIX) == full_name.starts_with(USER_BUILD_PHASE_PREFIX)
}

/// Return the index of the phase of type `isa` whose name ends with `suffix`, creating it when
/// none exists.
///
/// A found phase is renamed to `full_name` when its name drifted. A created phase is named
/// `full_name`, has environment logging disabled, is appended to the phase list, and is
/// announced through `sink`. Additional phases claimed by the same suffix are removed so the
/// target ends up with exactly one.
pub fn find_or_create_phase(
    target: &mut NativeTarget,
    full_name: &str,
    suffix: &str,
    isa: PhaseIsa,
    sink: &dyn EventSink,
) -> usize {
    let matches: Vec<usize> = target
        .build_phases
        .iter()
        .enumerate()
        .filter(|(_, p)| p.isa() == isa)
        .filter(|(_, p)| p.name().is_some_and(|n| claims(n, suffix, full_name)))
        .map(|(i, _)| i)
        .collect();

    if let Some((&first, duplicates)) = matches.split_first() {
        for &idx in duplicates.iter().rev() {
            let removed = target.build_phases.remove(idx);
            sink.emit(IntegrationEvent::PhaseRemoved {
                native_target: target.name.clone(),
                phase: removed.name().unwrap_or_default().to_string(),
            });
        }
        target.build_phases[first].set_name(full_name);
        return first;
    }

    let id = ObjectId::derive(&format!("phase:{}:{}", target.name, full_name));
    let mut phase = BuildPhase::new(isa, id, Some(full_name.to_string()));
    if let Some(script) = phase.as_shell_script_mut() {
        script.show_env_vars_in_log = false;
    }
    target.build_phases.push(phase);
    sink.emit(IntegrationEvent::PhaseAdded {
        native_target: target.name.clone(),
        phase: full_name.to_string(),
    });
    target.build_phases.len() - 1
}

/// Shell-script flavour of [`find_or_create_phase`].
pub fn find_or_create_shell_script_phase<'t>(
    target: &'t mut NativeTarget,
    full_name: &str,
    suffix: &str,
    sink: &dyn EventSink,
) -> &'t mut ShellScriptBuildPhase {
    let idx = find_or_create_phase(target, full_name, suffix, PhaseIsa::ShellScript, sink);
    match &mut target.build_phases[idx] {
        BuildPhase::ShellScript(phase) => phase,
        _ => unreachable!("find_or_create_phase matched a non shell-script phase"),
    }
}

/// Remove every shell-script phase claimed by `suffix`. Returns the number removed.
pub fn remove_script_phase(
    target: &mut NativeTarget,
    full_name: &str,
    suffix: &str,
    sink: &dyn EventSink,
) -> usize {
    remove_phases_where(target, sink, |name| claims(name, suffix, full_name))
}

/// Remove every shell-script phase whose name equals `name` exactly.
pub fn remove_script_phase_named(
    target: &mut NativeTarget,
    name: &str,
    sink: &dyn EventSink,
) -> usize {
    remove_phases_where(target, sink, |n| n == name)
}

fn remove_phases_where(
    target: &mut NativeTarget,
    sink: &dyn EventSink,
    pred: impl Fn(&str) -> bool,
) -> usize {
    let mut removed = Vec::new();
    target.build_phases.retain(|p| {
        let hit = p.isa() == PhaseIsa::ShellScript && p.name().is_some_and(&pred);
        if hit {
            removed.push(p.name().unwrap_or_default().to_string());
        }
        !hit
    });
    for phase in &removed {
        sink.emit(IntegrationEvent::PhaseRemoved {
            native_target: target.name.clone(),
            phase: phase.clone(),
        });
    }
    removed.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{EMBED_FRAMEWORK_PHASE_NAME, build_phase_name, user_build_phase_name};
    use crate::events::RecordingSink;
    use xcintegrate_types::project::SymbolType;

    fn app() -> NativeTarget {
        let mut t = NativeTarget::new("App", SymbolType::Application);
        t.build_phases.push(BuildPhase::new(
            PhaseIsa::Sources,
            ObjectId::derive("sources"),
            None,
        ));
        t
    }

    #[test]
    fn creates_phase_once_and_returns_same_phase_after() {
        let mut t = app();
        let sink = RecordingSink::new();
        let full = build_phase_name(EMBED_FRAMEWORK_PHASE_NAME);

        let first = find_or_create_phase(
            &mut t,
            &full,
            EMBED_FRAMEWORK_PHASE_NAME,
            PhaseIsa::ShellScript,
            &sink,
        );
        let id = t.build_phases[first].id().clone();
        let second = find_or_create_phase(
            &mut t,
            &full,
            EMBED_FRAMEWORK_PHASE_NAME,
            PhaseIsa::ShellScript,
            &sink,
        );

        assert_eq!(first, second);
        assert_eq!(t.build_phases[second].id(), &id);
        assert_eq!(t.build_phases.len(), 2);
        assert_eq!(sink.len(), 1);
        let phase = t.build_phases[first].as_shell_script().unwrap();
        assert!(!phase.show_env_vars_in_log);
        assert_eq!(phase.name.as_deref(), Some(full.as_str()));
    }

    #[test]
    fn renames_phase_with_old_prefix() {
        let mut t = app();
        t.build_phases.push(BuildPhase::new(
            PhaseIsa::ShellScript,
            ObjectId::derive("old"),
            Some("📦 Embed Pods Frameworks".to_string()),
        ));
        let sink = RecordingSink::new();
        let full = build_phase_name(EMBED_FRAMEWORK_PHASE_NAME);

        let id = find_or_create_shell_script_phase(&mut t, &full, EMBED_FRAMEWORK_PHASE_NAME, &sink)
            .id
            .clone();

        assert_eq!(id, ObjectId::derive("old"));
        assert_eq!(t.build_phases[1].name(), Some(full.as_str()));
        assert!(sink.is_empty());
    }

    #[test]
    fn collapses_duplicate_phases() {
        let mut t = app();
        for seed in ["a", "b"] {
            t.build_phases.push(BuildPhase::new(
                PhaseIsa::ShellScript,
                ObjectId::derive(seed),
                Some(build_phase_name(EMBED_FRAMEWORK_PHASE_NAME)),
            ));
        }
        let sink = RecordingSink::new();
        let full = build_phase_name(EMBED_FRAMEWORK_PHASE_NAME);
        let idx = find_or_create_phase(
            &mut t,
            &full,
            EMBED_FRAMEWORK_PHASE_NAME,
            PhaseIsa::ShellScript,
            &sink,
        );
        assert_eq!(t.build_phases[idx].id(), &ObjectId::derive("a"));
        assert_eq!(t.shell_script_phases().count(), 1);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn user_phase_with_builtin_suffix_is_not_claimed() {
        let mut t = app();
        let user = user_build_phase_name(EMBED_FRAMEWORK_PHASE_NAME);
        t.build_phases.push(BuildPhase::new(
            PhaseIsa::ShellScript,
            ObjectId::derive("user"),
            Some(user.clone()),
        ));
        let sink = RecordingSink::new();
        let full = build_phase_name(EMBED_FRAMEWORK_PHASE_NAME);

        find_or_create_phase(
            &mut t,
            &full,
            EMBED_FRAMEWORK_PHASE_NAME,
            PhaseIsa::ShellScript,
            &sink,
        );
        assert_eq!(t.shell_script_phases().count(), 2);
        assert_eq!(t.build_phases[1].name(), Some(user.as_str()));

        assert_eq!(
            remove_script_phase(&mut t, &full, EMBED_FRAMEWORK_PHASE_NAME, &sink),
            1
        );
        assert_eq!(t.build_phases[1].name(), Some(user.as_str()));
    }

    #[test]
    fn ignores_phases_of_other_types() {
        let mut t = app();
        t.build_phases.push(BuildPhase::new(
            PhaseIsa::CopyFiles,
            ObjectId::derive("copy"),
            Some(build_phase_name(EMBED_FRAMEWORK_PHASE_NAME)),
        ));
        let sink = RecordingSink::new();
        let full = build_phase_name(EMBED_FRAMEWORK_PHASE_NAME);
        let idx = find_or_create_phase(
            &mut t,
            &full,
            EMBED_FRAMEWORK_PHASE_NAME,
            PhaseIsa::ShellScript,
            &sink,
        );
        assert_eq!(idx, 2);
        assert_eq!(t.build_phases.len(), 3);
    }
}
