use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::*;
use crate::document::model::{Layout, Shape, SourceItem};
use crate::document::output::{ItemHandle, OutputItem};
use crate::foundation::core::{ContentCategory, Geometry};
use crate::place::strategy::{PlacementInput, PlacementStrategy};
use crate::render::backend::{Artifact, RenderSettings};
use crate::render::cpu::CpuBackend;
use crate::workflow::state::{FailureReason, WorkflowState};

/// Counts writers inside the critical section and remembers the peak.
#[derive(Clone, Default)]
struct Overlap {
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Overlap {
    fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(2));
    }

    fn leave(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

struct ProbeWriter {
    inner: OutputDocument,
    overlap: Overlap,
}

impl DocumentWriter for ProbeWriter {
    fn append(&mut self, item: OutputItem) -> ItemHandle {
        self.overlap.enter();
        let handle = self.inner.append(item);
        self.overlap.leave();
        handle
    }

    fn replace(&mut self, handle: ItemHandle, item: OutputItem) -> DeckResult<()> {
        self.overlap.enter();
        let res = self.inner.replace(handle, item);
        self.overlap.leave();
        res
    }

    fn into_document(self: Box<Self>) -> OutputDocument {
        self.inner
    }
}

struct Panicking;

impl PlacementStrategy for Panicking {
    fn name(&self) -> &'static str {
        "panicking"
    }

    fn place(&self, _input: &PlacementInput<'_>, _state: &mut WorkflowState) -> DeckResult<()> {
        panic!("placement exploded")
    }
}

/// Fails to render any item containing the text "boom".
struct Picky(CpuBackend);

impl RenderBackend for Picky {
    fn render(&self, shapes: &[Shape]) -> DeckResult<Artifact> {
        if shapes.iter().any(|s| s.text == "boom") {
            return Err(DeckError::render("cannot rasterize boom"));
        }
        self.0.render(shapes)
    }
}

fn cpu() -> CpuBackend {
    CpuBackend::new(RenderSettings {
        width: 160,
        height: 90,
        ..RenderSettings::default()
    })
    .unwrap()
}

fn blank_catalog(n: usize) -> TemplateCatalog {
    TemplateCatalog::new((0..n).map(|i| Layout::blank(format!("Blank {i}"))).collect())
}

fn text(s: &str) -> SourceItem {
    SourceItem::new(vec![Shape::text_box(Geometry::new(0, 0, 100, 20), s)])
}

fn bullets() -> SourceItem {
    SourceItem::new(vec![
        Shape::text_box(Geometry::new(0, 0, 100, 20), "a"),
        Shape::text_box(Geometry::new(0, 30, 100, 20), "b"),
        Shape::text_box(Geometry::new(0, 60, 100, 20), "c"),
    ])
}

fn deck(n: usize) -> SourceDeck {
    SourceDeck {
        items: (0..n)
            .map(|i| match i % 3 {
                0 => text(&format!("item {i}")),
                1 => SourceItem::default(),
                _ => bullets(),
            })
            .collect(),
    }
}

fn session(threads: usize) -> ConvertSession {
    ConvertSession::new(
        blank_catalog(3),
        Box::new(cpu()),
        ConvertOpts {
            threads: Some(threads),
            ..ConvertOpts::default()
        },
    )
    .unwrap()
}

#[test]
fn default_opts_allow_three_attempts() {
    let opts = ConvertOpts::default();
    assert_eq!(opts.max_attempts, 3);
    assert!(opts.validate().is_ok());
    assert_eq!(opts.limits(), RunLimits::new(3));
}

#[test]
fn invalid_opts_are_rejected() {
    for opts in [
        ConvertOpts {
            threads: Some(0),
            ..ConvertOpts::default()
        },
        ConvertOpts {
            max_attempts: 0,
            ..ConvertOpts::default()
        },
        ConvertOpts {
            max_steps: Some(0),
            ..ConvertOpts::default()
        },
    ] {
        let err = ConvertSession::new(blank_catalog(1), Box::new(cpu()), opts).unwrap_err();
        assert!(matches!(err, DeckError::Validation(_)));
    }
}

#[test]
fn explicit_step_budget_overrides_derived_one() {
    let opts = ConvertOpts {
        max_steps: Some(7),
        ..ConvertOpts::default()
    };
    assert_eq!(opts.limits().max_steps, 7);
    assert_eq!(opts.limits().max_attempts, 3);
}

#[test]
fn empty_catalog_is_rejected_before_any_run() {
    let err =
        ConvertSession::new(TemplateCatalog::default(), Box::new(cpu()), ConvertOpts::default())
            .unwrap_err();
    assert!(err.to_string().contains("at least one layout"));
}

#[test]
fn one_result_per_item_for_any_pool_size() {
    let deck = deck(10);
    for threads in [1, 2, 8] {
        let report = session(threads).convert(&deck).unwrap();
        assert_eq!(report.results.len(), 10);
        assert_eq!(report.document.len(), 10);
        let indices: Vec<_> = report.results.iter().map(|r| r.index).collect();
        assert_eq!(indices, (1..=10).collect::<Vec<_>>());
        let sources: Vec<_> = report.document.items.iter().map(|i| i.source_index).collect();
        assert_eq!(sources, indices);
        assert_eq!(report.succeeded(), 10);
        assert!(report.check().is_ok());
    }
}

#[test]
fn categories_pick_their_preferred_layouts() {
    let report = session(2).convert(&deck(3)).unwrap();
    let layouts: Vec<_> = report.results.iter().map(|r| r.layout).collect();
    assert_eq!(
        layouts,
        vec![
            Some(ContentCategory::Complex.preferred_layout()),
            Some(ContentCategory::Complex.preferred_layout()),
            Some(ContentCategory::Text.preferred_layout()),
        ]
    );
}

#[test]
fn document_writes_never_overlap() {
    let overlap = Overlap::default();
    let writer = ProbeWriter {
        inner: OutputDocument::new(),
        overlap: overlap.clone(),
    };
    // Titled layouts force retries, so runs replace as well as append.
    let catalog = TemplateCatalog::new(vec![
        Layout {
            name: "Title".to_string(),
            placeholders: vec![Shape::text_box(Geometry::new(0, 0, 160, 20), "")],
        },
        Layout::blank("Blank"),
    ]);
    let opts = ConvertOpts {
        threads: Some(8),
        ..ConvertOpts::default()
    };
    let session = ConvertSession::new(catalog, Box::new(cpu()), opts).unwrap();
    let report = session.convert_into(&deck(24), Box::new(writer)).unwrap();

    assert_eq!(report.results.len(), 24);
    assert_eq!(report.document.len(), 24);
    assert_eq!(overlap.peak.load(Ordering::SeqCst), 1);
    assert_eq!(overlap.active.load(Ordering::SeqCst), 0);
}

#[test]
fn render_failure_stays_with_its_item() {
    let session = ConvertSession::new(
        blank_catalog(3),
        Box::new(Picky(cpu())),
        ConvertOpts {
            threads: Some(4),
            ..ConvertOpts::default()
        },
    )
    .unwrap();
    let deck = SourceDeck {
        items: vec![text("fine"), text("boom"), text("also fine")],
    };
    let report = session.convert(&deck).unwrap();

    assert!(report.results[0].success);
    assert!(report.results[2].success);
    let broken = &report.results[1];
    assert!(!broken.success);
    assert_eq!(
        broken.failure,
        Some(FailureReason::Render("cannot rasterize boom".to_string()))
    );
    assert!(report.check().is_ok());
    // The broken baseline stops the run before placement.
    assert_eq!(report.document.len(), 2);
}

#[test]
fn panicking_run_is_fatal_but_isolated() {
    let mut placements = PlacementRegistry::default();
    placements.register(ContentCategory::Complex, Box::new(Panicking));
    let session = session(2).with_placements(placements);
    let deck = SourceDeck {
        items: vec![bullets(), SourceItem::default(), bullets()],
    };
    let report = session.convert(&deck).unwrap();

    assert_eq!(report.results.len(), 3);
    assert!(report.results[1].is_fatal());
    assert_eq!(
        report.results[1].failure,
        Some(FailureReason::Fatal("placement exploded".to_string()))
    );
    assert_eq!(report.fatal().count(), 1);
    assert_eq!(report.failed(), 1);
    let err = report.check().unwrap_err();
    assert!(err.to_string().contains("item 2"));
}

#[test]
fn empty_deck_yields_empty_report() {
    let report = session(1).convert(&SourceDeck::default()).unwrap();
    assert!(report.results.is_empty());
    assert!(report.document.is_empty());
}

#[test]
fn malformed_deck_is_rejected() {
    let deck = SourceDeck {
        items: vec![SourceItem::new(vec![Shape::text_box(
            Geometry::new(0, 0, -1, 10),
            "bad",
        )])],
    };
    let err = session(1).convert(&deck).unwrap_err();
    assert!(err.to_string().contains("item 1"));
}
