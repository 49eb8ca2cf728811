use super::{IntegrationStep, StepMeta, for_each_named};
use crate::events::EventSink;
use crate::integrator::IntegrationContext;
use xcintegrate_types::events::IntegrationEvent;
use xcintegrate_types::project::{BuildPhase, ObjectId, Project};

/// Keeps exactly one product reference, typed for the current product kind, linked into every
/// native target.
pub struct ProductReferenceStep;

impl ProductReferenceStep {
    /// Drop references named for the other product kind from the shared group, and every build
    /// file pointing at them from every link phase in the project.
    fn remove_stale(project: &mut Project, stale_name: &str, sink: &dyn EventSink) {
        let stale: Vec<ObjectId> = project
            .frameworks_group
            .children
            .iter()
            .filter(|r| r.path == stale_name)
            .map(|r| r.id.clone())
            .collect();
        if stale.is_empty() {
            return;
        }

        for native in project.targets.iter_mut() {
            let mut removed = 0;
            for phase in native.build_phases.iter_mut() {
                if let BuildPhase::Frameworks(link) = phase {
                    removed += stale
                        .iter()
                        .map(|id| link.remove_file_reference(id))
                        .sum::<usize>();
                }
            }
            if removed > 0 {
                sink.emit(IntegrationEvent::ProductReferenceRemoved {
                    native_target: native.name.clone(),
                    path: stale_name.to_string(),
                });
            }
        }

        for id in &stale {
            project.frameworks_group.remove_reference(id);
        }
    }
}

impl IntegrationStep for ProductReferenceStep {
    fn meta(&self) -> StepMeta {
        StepMeta {
            key: "product_reference",
            title: "Link the product reference for the current product type",
        }
    }

    fn apply(&self, ctx: &IntegrationContext<'_>, project: &mut Project, sink: &dyn EventSink) {
        if ctx.native_targets.is_empty() {
            return;
        }
        let target = ctx.target;
        Self::remove_stale(project, &target.other_product_name(), sink);

        let product_name = target.product_name();
        let ref_id = match project.frameworks_group.file_by_path(&product_name) {
            Some(existing) => existing.id.clone(),
            None => project
                .frameworks_group
                .new_product_ref(&target.product_basename, target.product_kind()),
        };

        for_each_named(project, &ctx.native_targets, |native| {
            if native.frameworks_build_phase_mut().add_file_reference(&ref_id) {
                sink.emit(IntegrationEvent::ProductReferenceAdded {
                    native_target: native.name.clone(),
                    path: product_name.clone(),
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use crate::integrator::IntegrationOptions;
    use xcintegrate_types::project::{NativeTarget, ProductKind, SymbolType};
    use xcintegrate_types::target::IntegrationTarget;

    fn target(framework: bool) -> IntegrationTarget {
        IntegrationTarget {
            label: "Pods-App".into(),
            product_basename: "Pods_App".into(),
            build_as_framework: framework,
            user_target_names: vec!["App".into()],
            ..IntegrationTarget::default()
        }
    }

    fn project() -> Project {
        let mut p = Project::new("App");
        p.targets
            .push(NativeTarget::new("App", SymbolType::Application));
        p
    }

    fn linked_paths(project: &Project) -> Vec<String> {
        let link = project.targets[0].frameworks_build_phase().unwrap();
        link.files
            .iter()
            .filter_map(|f| {
                project
                    .frameworks_group
                    .children
                    .iter()
                    .find(|r| r.id == f.file_ref)
            })
            .map(|r| r.path.clone())
            .collect()
    }

    fn run(target: &IntegrationTarget, project: &mut Project, sink: &dyn EventSink) {
        let ctx = IntegrationContext::new(target, project, IntegrationOptions::default());
        ProductReferenceStep.apply(&ctx, project, sink);
    }

    #[test]
    fn links_product_once() {
        let t = target(false);
        let mut p = project();
        let sink = RecordingSink::new();
        run(&t, &mut p, &sink);
        run(&t, &mut p, &sink);

        assert_eq!(linked_paths(&p), vec!["libPods_App.a".to_string()]);
        assert_eq!(sink.len(), 1);
        let file = &p.frameworks_group.children[0];
        assert_eq!(
            file.explicit_file_type.as_deref(),
            Some(ProductKind::StaticLibrary.explicit_file_type())
        );
    }

    #[test]
    fn switching_to_framework_replaces_static_library() {
        let mut p = project();
        let sink = RecordingSink::new();
        run(&target(false), &mut p, &sink);
        run(&target(true), &mut p, &sink);

        assert_eq!(linked_paths(&p), vec!["Pods_App.framework".to_string()]);
        assert_eq!(p.frameworks_group.children.len(), 1);
        let kinds: Vec<&str> = sink.events().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                "product_reference_added",
                "product_reference_removed",
                "product_reference_added"
            ]
        );
    }

    #[test]
    fn no_native_targets_leaves_group_alone() {
        let t = IntegrationTarget {
            user_target_names: vec!["Missing".into()],
            ..target(false)
        };
        let mut p = project();
        run(&t, &mut p, &RecordingSink::new());
        assert!(p.frameworks_group.children.is_empty());
    }
}
