//! The two-pass materializer: synchronizes the catalog to a remote tracker.
//!
//! Remote issue numbers only exist once an issue has been created, so a
//! dependency declared on an entry later in the catalog cannot be referenced
//! concretely while its dependent is being created. The classic two-pass
//! answer is used: the creation pass emits placeholder text for unresolved
//! references, and the annotation pass backpatches every dependent with the
//! resolved numbers once all of them exist.
//!
//! Both passes are strictly sequential. Each creation renders against the
//! resolution map *as it stands at that point*, so reordering the pass would
//! change which references resolve inline; the annotation pass provides
//! ground truth regardless of catalog order.
//!
//! A failed remote call aborts the run immediately. Already-created issues
//! are not rolled back, and a re-run creates every catalog entry again —
//! repeated runs after a mid-pass failure duplicate the items created before
//! the failure. That limitation is documented rather than silently handled.

use tracing::info;

use crate::catalog::Catalog;
use crate::errors::SeederError;
use crate::identifiers::{IssueNumber, SpecKey};
use crate::ports::{IssueTracker, PreviewSink};
use crate::render::{render_annotation, render_body};
use crate::resolution::ResolutionMap;

/// Drives the creation and annotation passes over one catalog.
///
/// Owns nothing but a borrow of the catalog; the [`ResolutionMap`] is built
/// per run, written only by the creation pass, and read-only afterwards.
pub struct Materializer<'a> {
    catalog: &'a Catalog,
}

impl<'a> Materializer<'a> {
    /// Creates a materializer over `catalog`.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Creates every catalog entry, then annotates every dependent.
    ///
    /// Returns the fully populated resolution map on success. On the first
    /// remote failure the run aborts: no further entries are created, the
    /// annotation pass does not start, and the error carries the remote
    /// status and body verbatim.
    pub async fn create_all(
        &self,
        tracker: &dyn IssueTracker,
    ) -> Result<ResolutionMap, SeederError> {
        let mut resolved = ResolutionMap::new();
        self.creation_pass(tracker, &mut resolved).await?;
        self.annotation_pass(tracker, &resolved).await?;
        Ok(resolved)
    }

    /// Renders each entry against an empty resolution map and hands it to
    /// `sink` for human review. No remote calls; no resolution-map entries.
    pub fn preview(&self, sink: &mut dyn PreviewSink) {
        let unresolved = ResolutionMap::new();
        for (position, spec) in self.catalog.iter().enumerate() {
            let body = render_body(spec, &unresolved);
            sink.preview(position + 1, &spec.title, &body);
        }
    }

    /// Pass 1: create issues in catalog order.
    ///
    /// Each body is rendered against the map as it stands mid-pass, so
    /// dependencies created earlier in this same pass are embedded directly
    /// and later ones render as placeholders.
    async fn creation_pass(
        &self,
        tracker: &dyn IssueTracker,
        resolved: &mut ResolutionMap,
    ) -> Result<(), SeederError> {
        for spec in self.catalog.iter() {
            let body = render_body(spec, resolved);
            let issue = tracker
                .create_issue(&spec.title, &body)
                .await
                .map_err(|source| SeederError::CreateFailed {
                    key: spec.key.clone(),
                    source,
                })?;
            resolved.record(spec.key.clone(), issue);
            info!(key = %spec.key, issue = %issue, title = %spec.title, "created issue");
        }
        Ok(())
    }

    /// Pass 2: attach a fully resolved dependency listing to every entry
    /// with at least one dependency.
    ///
    /// Runs only after the creation pass has covered the whole catalog, so
    /// every lookup must succeed.
    async fn annotation_pass(
        &self,
        tracker: &dyn IssueTracker,
        resolved: &ResolutionMap,
    ) -> Result<(), SeederError> {
        for spec in self.catalog.iter() {
            if spec.depends_on.is_empty() {
                continue;
            }
            let issue = resolved_number(resolved, &spec.key)?;
            let dependencies = spec
                .depends_on
                .iter()
                .map(|dependency| resolved_number(resolved, dependency))
                .collect::<Result<Vec<_>, _>>()?;
            let note = render_annotation(&dependencies);
            tracker
                .comment_on_issue(issue, &note)
                .await
                .map_err(|source| SeederError::AnnotateFailed {
                    key: spec.key.clone(),
                    issue,
                    source,
                })?;
            info!(key = %spec.key, issue = %issue, dependencies = dependencies.len(), "annotated dependencies");
        }
        Ok(())
    }
}

fn resolved_number(resolved: &ResolutionMap, key: &SpecKey) -> Result<IssueNumber, SeederError> {
    resolved
        .get(key)
        .ok_or_else(|| SeederError::MissingResolution { key: key.clone() })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalog::tests::spec;
    use crate::errors::RemoteError;
    use crate::ports::IssueTracker;

    /// In-memory tracker: assigns numbers 101, 102, ... and records every
    /// call. `fail_on_creation` scripts the nth creation call to fail.
    #[derive(Default)]
    struct FakeTracker {
        fail_on_creation: Option<usize>,
        fail_on_comment: Option<usize>,
        created: Mutex<Vec<(String, String)>>,
        comments: Mutex<Vec<(IssueNumber, String)>>,
    }

    impl FakeTracker {
        fn created(&self) -> Vec<(String, String)> {
            self.created.lock().unwrap().clone()
        }

        fn comments(&self) -> Vec<(IssueNumber, String)> {
            self.comments.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl IssueTracker for FakeTracker {
        async fn create_issue(&self, title: &str, body: &str) -> Result<IssueNumber, RemoteError> {
            let mut created = self.created.lock().unwrap();
            if self.fail_on_creation == Some(created.len() + 1) {
                return Err(RemoteError::Protocol {
                    status: 422,
                    body: "Validation Failed".to_string(),
                });
            }
            created.push((title.to_string(), body.to_string()));
            Ok(IssueNumber::new(100 + created.len() as u64))
        }

        async fn comment_on_issue(
            &self,
            issue: IssueNumber,
            body: &str,
        ) -> Result<(), RemoteError> {
            let mut comments = self.comments.lock().unwrap();
            if self.fail_on_comment == Some(comments.len() + 1) {
                return Err(RemoteError::Protocol {
                    status: 403,
                    body: "Forbidden".to_string(),
                });
            }
            comments.push((issue, body.to_string()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        seen: Vec<(usize, String, String)>,
    }

    impl PreviewSink for RecordingSink {
        fn preview(&mut self, position: usize, title: &str, body: &str) {
            self.seen
                .push((position, title.to_string(), body.to_string()));
        }
    }

    fn catalog(specs: Vec<crate::catalog::Specification>) -> Catalog {
        Catalog::from_specs(specs).unwrap()
    }

    #[tokio::test]
    async fn dependency_created_earlier_resolves_inline() {
        // Catalog order already places "a" before its dependent.
        let catalog = catalog(vec![spec("a", &[]), spec("b", &["a"])]);
        let tracker = FakeTracker::default();

        let resolved = Materializer::new(&catalog)
            .create_all(&tracker)
            .await
            .unwrap();

        let created = tracker.created();
        assert_eq!(created.len(), 2);
        // "a" became #101, so "b"'s body carried the concrete reference.
        assert!(created[1].1.contains("- #101"));
        assert!(!created[1].1.contains("not yet created"));
        assert_eq!(
            resolved.get(&SpecKey::new("b").unwrap()),
            Some(IssueNumber::new(102))
        );
    }

    #[tokio::test]
    async fn forward_reference_gets_placeholder_then_annotation() {
        // Reverse order: the dependent is created before its dependency.
        let catalog = catalog(vec![spec("b", &["a"]), spec("a", &[])]);
        let tracker = FakeTracker::default();

        Materializer::new(&catalog)
            .create_all(&tracker)
            .await
            .unwrap();

        let created = tracker.created();
        // "b" was created first (#101) while "a" did not exist yet.
        assert!(created[0].1.contains("- (not yet created: `a`)"));

        // The annotation pass backpatched "b" with "a"'s real number (#102).
        let comments = tracker.comments();
        assert_eq!(
            comments,
            vec![(IssueNumber::new(101), "Depends on: #102".to_string())]
        );
    }

    #[tokio::test]
    async fn annotation_lists_every_dependency() {
        let catalog = catalog(vec![
            spec("a", &[]),
            spec("b", &[]),
            spec("c", &["a", "b"]),
        ]);
        let tracker = FakeTracker::default();

        Materializer::new(&catalog)
            .create_all(&tracker)
            .await
            .unwrap();

        assert_eq!(
            tracker.comments(),
            vec![(IssueNumber::new(103), "Depends on: #101, #102".to_string())]
        );
    }

    #[tokio::test]
    async fn entries_without_dependencies_are_not_annotated() {
        let catalog = catalog(vec![spec("a", &[]), spec("b", &[])]);
        let tracker = FakeTracker::default();

        Materializer::new(&catalog)
            .create_all(&tracker)
            .await
            .unwrap();

        assert!(tracker.comments().is_empty());
    }

    #[tokio::test]
    async fn creation_failure_aborts_mid_pass() {
        let catalog = catalog(vec![
            spec("1", &[]),
            spec("2", &[]),
            spec("3", &[]),
            spec("4", &[]),
            spec("5", &["1"]),
        ]);
        let tracker = FakeTracker {
            fail_on_creation: Some(3),
            ..FakeTracker::default()
        };

        let materializer = Materializer::new(&catalog);
        let mut resolved = ResolutionMap::new();
        let err = materializer
            .creation_pass(&tracker, &mut resolved)
            .await
            .unwrap_err();

        // Items 1-2 were created and stay recorded; 3-5 were never attempted.
        assert_eq!(resolved.len(), 2);
        assert!(resolved.contains(&SpecKey::new("1").unwrap()));
        assert!(resolved.contains(&SpecKey::new("2").unwrap()));
        assert!(!resolved.contains(&SpecKey::new("3").unwrap()));
        assert_eq!(tracker.created().len(), 2);

        match err {
            SeederError::CreateFailed { key, source } => {
                assert_eq!(key.as_str(), "3");
                assert!(matches!(source, RemoteError::Protocol { status: 422, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }

        // The annotation pass never ran.
        assert!(tracker.comments().is_empty());
    }

    #[tokio::test]
    async fn creation_failure_skips_annotation_pass() {
        let catalog = catalog(vec![spec("a", &[]), spec("b", &["a"])]);
        let tracker = FakeTracker {
            fail_on_creation: Some(2),
            ..FakeTracker::default()
        };

        let err = Materializer::new(&catalog)
            .create_all(&tracker)
            .await
            .unwrap_err();

        assert!(matches!(err, SeederError::CreateFailed { .. }));
        assert!(tracker.comments().is_empty());
    }

    #[tokio::test]
    async fn annotation_failure_surfaces_issue_and_key() {
        let catalog = catalog(vec![spec("a", &[]), spec("b", &["a"])]);
        let tracker = FakeTracker {
            fail_on_comment: Some(1),
            ..FakeTracker::default()
        };

        let err = Materializer::new(&catalog)
            .create_all(&tracker)
            .await
            .unwrap_err();

        match err {
            SeederError::AnnotateFailed { key, issue, source } => {
                assert_eq!(key.as_str(), "b");
                assert_eq!(issue, IssueNumber::new(102));
                assert!(matches!(source, RemoteError::Protocol { status: 403, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn preview_renders_placeholders_and_touches_nothing_remote() {
        let catalog = catalog(vec![spec("a", &[]), spec("b", &["a"])]);
        let mut sink = RecordingSink::default();

        Materializer::new(&catalog).preview(&mut sink);

        assert_eq!(sink.seen.len(), 2);
        assert_eq!(sink.seen[0].0, 1);
        assert_eq!(sink.seen[0].1, "Title a");
        assert_eq!(sink.seen[1].0, 2);
        // Dry runs render against an empty map: every reference is a placeholder.
        assert!(sink.seen[1].2.contains("- (not yet created: `a`)"));
    }
}
