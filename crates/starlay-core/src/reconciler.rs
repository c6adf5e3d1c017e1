use std::collections::BTreeMap;

use image::RgbaImage;
use starlay_types::{Color, HashKey, SurfaceOwner, WindowCommand, WindowId};

use crate::hash::{self, HashExtractor};
use crate::region::RegionSpec;
use crate::store::TranslationDatabase;

/// Read-only inputs shared by every reconciler during one tick
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    pub database: &'a TranslationDatabase,
    pub overrides: &'a BTreeMap<HashKey, Color>,
    pub hasher: &'a dyn HashExtractor,
}

/// A region started showing a hash it was not showing on the previous tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub region: usize,
    pub hash: HashKey,
    pub text: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub commands: Vec<WindowCommand>,
    pub detection: Option<Detection>,
}

#[derive(Debug)]
struct LiveOverlay {
    overlay: WindowId,
    patches: Vec<WindowId>,
    hash: HashKey,
    text: String,
    color: Color,
}

/// Keeps one region's overlay in step with what is on screen.
///
/// Holds at most one overlay and its patches. `live` is `None` exactly when
/// no overlay surface exists.
#[derive(Debug)]
pub struct RegionReconciler {
    index: usize,
    spec: RegionSpec,
    live: Option<LiveOverlay>,
    last_hash: Option<HashKey>,
    serial: u32,
}

impl RegionReconciler {
    pub fn new(index: usize, spec: RegionSpec) -> Self {
        Self {
            index,
            spec,
            live: None,
            last_hash: None,
            serial: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn spec(&self) -> &RegionSpec {
        &self.spec
    }

    pub fn is_showing(&self) -> bool {
        self.live.is_some()
    }

    pub fn displayed_hash(&self) -> Option<&HashKey> {
        self.live.as_ref().map(|live| &live.hash)
    }

    pub fn displayed_text(&self) -> Option<&str> {
        self.live.as_ref().map(|live| live.text.as_str())
    }

    pub fn displayed_color(&self) -> Option<Color> {
        self.live.as_ref().map(|live| live.color)
    }

    pub fn last_hash(&self) -> Option<&HashKey> {
        self.last_hash.as_ref()
    }

    /// Decide what this region's surfaces should look like for `screenshot`
    pub fn reconcile(
        &mut self,
        screenshot: &RgbaImage,
        ctx: &TickContext<'_>,
        enabled: bool,
    ) -> Reconciliation {
        if !enabled {
            return self.cleared();
        }

        let Some(hash) = hash::sample(ctx.hasher, screenshot, &self.spec.crop()) else {
            return self.cleared();
        };

        let text = ctx.database.lookup(hash.as_str());
        if text.is_empty() {
            return self.cleared();
        }

        let color = ctx
            .overrides
            .get(&hash)
            .copied()
            .or(self.spec.color())
            .unwrap_or(Color::WHITE);
        let is_new_hash = self.last_hash.as_ref() != Some(&hash);

        let mut commands = Vec::new();
        let needs_create = self.live.as_ref().is_none_or(|live| live.color != color);
        if needs_create {
            if let Some(old) = self.live.take() {
                destroy_into(&old, &mut commands);
            }
            let live = self.create(&hash, color, &mut commands);
            self.live = Some(live);
        }

        let Some(live) = self.live.as_mut() else {
            return Reconciliation::default();
        };

        if is_new_hash || live.text != text {
            commands.push(WindowCommand::SetText {
                id: live.overlay,
                text: text.to_string(),
            });
            live.text = text.to_string();
        }

        let detection = is_new_hash.then(|| Detection {
            region: self.index,
            hash: hash.clone(),
            text: text.to_string(),
        });

        live.hash = hash.clone();
        self.last_hash = Some(hash);

        Reconciliation {
            commands,
            detection,
        }
    }

    /// Destroy the overlay and its patches, forget the last hash
    pub fn teardown(&mut self) -> Vec<WindowCommand> {
        let mut commands = Vec::new();
        if let Some(live) = self.live.take() {
            destroy_into(&live, &mut commands);
        }
        self.last_hash = None;
        commands
    }

    fn cleared(&mut self) -> Reconciliation {
        Reconciliation {
            commands: self.teardown(),
            detection: None,
        }
    }

    fn next_id(&mut self) -> WindowId {
        self.serial = self.serial.wrapping_add(1);
        WindowId {
            owner: SurfaceOwner::Region(self.index),
            serial: self.serial,
        }
    }

    fn create(&mut self, hash: &HashKey, color: Color, commands: &mut Vec<WindowCommand>) -> LiveOverlay {
        let overlay = self.next_id();
        commands.push(WindowCommand::CreateOverlay {
            id: overlay,
            rect: self.spec.overlay(),
            background: color,
            holes: self.spec.holes().to_vec(),
            font_pt: self.spec.font_pt(),
        });

        let blocks: Vec<_> = self.spec.block_patches().cloned().collect();
        let mut patches = Vec::with_capacity(blocks.len());
        for block in blocks {
            let id = self.next_id();
            commands.push(WindowCommand::CreatePatch {
                id,
                rect: block.rect,
                color: block.color,
                text: block.text,
                font_pt: block.font_pt,
            });
            patches.push(id);
        }

        LiveOverlay {
            overlay,
            patches,
            hash: hash.clone(),
            text: String::new(),
            color,
        }
    }
}

fn destroy_into(live: &LiveOverlay, commands: &mut Vec<WindowCommand>) {
    commands.extend(
        live.patches
            .iter()
            .map(|&id| WindowCommand::Destroy { id }),
    );
    commands.push(WindowCommand::Destroy { id: live.overlay });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{BlockPatch, PatchSpec};
    use crate::testing::{pixel_hash, screen_with};
    use starlay_types::Rect;

    const CROP: Rect = Rect::new(0, 0, 8, 8);
    const OVERLAY: Rect = Rect::new(100, 100, 200, 50);

    fn region(color: Option<Color>) -> RegionReconciler {
        let patches = vec![
            PatchSpec::Block(BlockPatch {
                rect: Rect::new(300, 100, 20, 20),
                color: Color::WHITE,
                text: String::new(),
                font_pt: 12,
            }),
            PatchSpec::Hole {
                rect: Rect::new(110, 90, 10, 20),
            },
        ];
        RegionReconciler::new(0, RegionSpec::new(CROP, OVERLAY, patches, 13, color))
    }

    fn db(entries: &[(&str, &str)]) -> TranslationDatabase {
        entries.iter().copied().collect()
    }

    fn run(
        reconciler: &mut RegionReconciler,
        database: &TranslationDatabase,
        overrides: &BTreeMap<HashKey, Color>,
        pixel: [u8; 4],
    ) -> Reconciliation {
        let ctx = TickContext {
            database,
            overrides,
            hasher: &pixel_hash,
        };
        reconciler.reconcile(&screen_with(CROP, pixel), &ctx, true)
    }

    fn creates(commands: &[WindowCommand]) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, WindowCommand::CreateOverlay { .. }))
            .count()
    }

    fn destroys(commands: &[WindowCommand]) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, WindowCommand::Destroy { .. }))
            .count()
    }

    #[test]
    fn test_worked_example() {
        let mut reconciler = region(None);
        let overrides = BTreeMap::new();
        let hello = db(&[("a1b2c3d4", "Hello world")]);

        let first = run(&mut reconciler, &hello, &overrides, [0xa1, 0xb2, 0xc3, 0xd4]);
        assert_eq!(first.commands.len(), 3);
        match &first.commands[0] {
            WindowCommand::CreateOverlay {
                rect,
                background,
                holes,
                ..
            } => {
                assert_eq!(*rect, OVERLAY);
                assert_eq!(*background, Color::WHITE);
                assert_eq!(holes, &vec![Rect::new(10, 0, 10, 10)]);
            }
            other => panic!("expected overlay creation, got {other:?}"),
        }
        assert!(matches!(first.commands[1], WindowCommand::CreatePatch { .. }));
        assert!(matches!(
            &first.commands[2],
            WindowCommand::SetText { text, .. } if text == "Hello world"
        ));
        assert_eq!(
            first.detection,
            Some(Detection {
                region: 0,
                hash: HashKey::new("a1b2c3d4"),
                text: "Hello world".to_string(),
            })
        );

        assert_eq!(reconciler.displayed_hash().map(HashKey::as_str), Some("a1b2c3d4"));

        let emptied = db(&[("a1b2c3d4", "")]);
        let second = run(&mut reconciler, &emptied, &overrides, [0xa1, 0xb2, 0xc3, 0xd4]);
        assert_eq!(destroys(&second.commands), 2);
        assert_eq!(second.commands.len(), 2);
        assert!(!reconciler.is_showing());
        assert!(reconciler.last_hash().is_none());
        assert!(reconciler.displayed_hash().is_none());
    }

    #[test]
    fn test_steady_state_is_idempotent() {
        let mut reconciler = region(None);
        let overrides = BTreeMap::new();
        let database = db(&[("01020304", "Hi")]);

        let first = run(&mut reconciler, &database, &overrides, [1, 2, 3, 4]);
        assert!(!first.commands.is_empty());

        for _ in 0..3 {
            let again = run(&mut reconciler, &database, &overrides, [1, 2, 3, 4]);
            assert!(again.commands.is_empty());
            assert!(again.detection.is_none());
        }
    }

    #[test]
    fn test_untranslated_hash_creates_nothing() {
        let mut reconciler = region(None);
        let overrides = BTreeMap::new();
        let database = db(&[("01020304", "   ")]);

        let result = run(&mut reconciler, &database, &overrides, [1, 2, 3, 4]);
        assert_eq!(result, Reconciliation::default());
        assert!(!reconciler.is_showing());

        let unknown = run(&mut reconciler, &database, &overrides, [9, 9, 9, 9]);
        assert_eq!(unknown, Reconciliation::default());
    }

    #[test]
    fn test_color_change_recreates_once() {
        let mut reconciler = region(Some(Color::rgb(1, 1, 1)));
        let red = Color::rgb(255, 0, 0);
        let mut overrides = BTreeMap::new();
        overrides.insert(HashKey::new("0a0a0a0a"), red);
        let database = db(&[("01020304", "Plain"), ("0a0a0a0a", "Red")]);

        let plain = run(&mut reconciler, &database, &overrides, [1, 2, 3, 4]);
        assert_eq!(creates(&plain.commands), 1);
        assert_eq!(reconciler.displayed_color(), Some(Color::rgb(1, 1, 1)));

        let recolored = run(&mut reconciler, &database, &overrides, [10, 10, 10, 10]);
        assert_eq!(creates(&recolored.commands), 1);
        assert_eq!(destroys(&recolored.commands), 2);
        assert_eq!(reconciler.displayed_color(), Some(red));
        assert!(matches!(
            recolored.commands.last(),
            Some(WindowCommand::SetText { text, .. }) if text == "Red"
        ));

        let steady = run(&mut reconciler, &database, &overrides, [10, 10, 10, 10]);
        assert!(steady.commands.is_empty());
    }

    #[test]
    fn test_same_color_hash_change_only_sets_text() {
        let mut reconciler = region(None);
        let overrides = BTreeMap::new();
        let database = db(&[("01020304", "One"), ("05060708", "Two")]);

        run(&mut reconciler, &database, &overrides, [1, 2, 3, 4]);
        let next = run(&mut reconciler, &database, &overrides, [5, 6, 7, 8]);

        assert_eq!(next.commands.len(), 1);
        assert!(matches!(
            &next.commands[0],
            WindowCommand::SetText { text, .. } if text == "Two"
        ));
        assert_eq!(next.detection.map(|d| d.hash), Some(HashKey::new("05060708")));
    }

    #[test]
    fn test_edited_text_updates_without_detection() {
        let mut reconciler = region(None);
        let overrides = BTreeMap::new();

        run(&mut reconciler, &db(&[("01020304", "Draft")]), &overrides, [1, 2, 3, 4]);
        let edited = run(&mut reconciler, &db(&[("01020304", "Final")]), &overrides, [1, 2, 3, 4]);

        assert_eq!(edited.commands.len(), 1);
        assert!(edited.detection.is_none());
        assert_eq!(reconciler.displayed_text(), Some("Final"));
    }

    #[test]
    fn test_detection_fires_again_after_disappearing() {
        let mut reconciler = region(None);
        let overrides = BTreeMap::new();
        let database = db(&[("01020304", "Hi")]);

        assert!(run(&mut reconciler, &database, &overrides, [1, 2, 3, 4]).detection.is_some());
        assert!(run(&mut reconciler, &database, &overrides, [0, 0, 0, 0]).detection.is_none());
        assert!(run(&mut reconciler, &database, &overrides, [1, 2, 3, 4]).detection.is_some());
    }

    #[test]
    fn test_disabled_tears_down() {
        let mut reconciler = region(None);
        let overrides = BTreeMap::new();
        let database = db(&[("01020304", "Hi")]);
        run(&mut reconciler, &database, &overrides, [1, 2, 3, 4]);

        let ctx = TickContext {
            database: &database,
            overrides: &overrides,
            hasher: &pixel_hash,
        };
        let screen = screen_with(CROP, [1, 2, 3, 4]);
        let off = reconciler.reconcile(&screen, &ctx, false);
        assert_eq!(destroys(&off.commands), 2);
        assert!(reconciler.reconcile(&screen, &ctx, false).commands.is_empty());
    }

    #[test]
    fn test_crop_outside_screen_is_no_match() {
        let spec = RegionSpec::new(Rect::new(5000, 5000, 8, 8), OVERLAY, Vec::new(), 13, None);
        let mut reconciler = RegionReconciler::new(4, spec);
        let overrides = BTreeMap::new();
        let database = db(&[("00000000", "Hi")]);
        let ctx = TickContext {
            database: &database,
            overrides: &overrides,
            hasher: &pixel_hash,
        };

        let result = reconciler.reconcile(&screen_with(CROP, [0, 0, 0, 0]), &ctx, true);
        assert_eq!(result, Reconciliation::default());
    }
}
