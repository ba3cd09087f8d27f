//! Window lifecycle registry
//!
//! Single source of truth for "is window kind K currently open, and if so,
//! which instance". At most one live window exists per kind; opening an
//! already-open kind brings the existing instance to the front instead of
//! constructing a duplicate. The registry owns the shared dataset
//! reference and lends it to every window it constructs.

use std::rc::Rc;

use crate::domain::dataset::SharedDataset;

/// Closed catalog of window categories
///
/// Declaration order is the fixed close order used by `close_all`:
/// dependent editors and views first, the main window last (and spared).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowKind {
    Control,
    Response,
    DatasetSummary,
    StreamGage,
    DelayTableMonthly,
    DelayTableDaily,
    Diversion,
    Precipitation,
    Evaporation,
    Reservoir,
    InstreamFlow,
    ConsumptiveUse,
    Well,
    Plan,
    StreamEstimate,
    RiverNetwork,
    OperationalRight,
    Map,
    Network,
    AddNode,
    QueryTool,
    GraphingTool,
    RunReport,
    RunSimulation,
    Main,
}

impl WindowKind {
    /// Every window kind, in declared close order
    pub const ALL: [WindowKind; 25] = [
        WindowKind::Control,
        WindowKind::Response,
        WindowKind::DatasetSummary,
        WindowKind::StreamGage,
        WindowKind::DelayTableMonthly,
        WindowKind::DelayTableDaily,
        WindowKind::Diversion,
        WindowKind::Precipitation,
        WindowKind::Evaporation,
        WindowKind::Reservoir,
        WindowKind::InstreamFlow,
        WindowKind::ConsumptiveUse,
        WindowKind::Well,
        WindowKind::Plan,
        WindowKind::StreamEstimate,
        WindowKind::RiverNetwork,
        WindowKind::OperationalRight,
        WindowKind::Map,
        WindowKind::Network,
        WindowKind::AddNode,
        WindowKind::QueryTool,
        WindowKind::GraphingTool,
        WindowKind::RunReport,
        WindowKind::RunSimulation,
        WindowKind::Main,
    ];

    /// Human-readable window title stem
    pub fn label(self) -> &'static str {
        match self {
            WindowKind::Control => "Control",
            WindowKind::Response => "Response",
            WindowKind::DatasetSummary => "Dataset Summary",
            WindowKind::StreamGage => "Stream Gage",
            WindowKind::DelayTableMonthly => "Delay Tables (Monthly)",
            WindowKind::DelayTableDaily => "Delay Tables (Daily)",
            WindowKind::Diversion => "Diversions",
            WindowKind::Precipitation => "Precipitation",
            WindowKind::Evaporation => "Evaporation",
            WindowKind::Reservoir => "Reservoirs",
            WindowKind::InstreamFlow => "Instream Flows",
            WindowKind::ConsumptiveUse => "Consumptive Use",
            WindowKind::Well => "Wells",
            WindowKind::Plan => "Plans",
            WindowKind::StreamEstimate => "Stream Estimates",
            WindowKind::RiverNetwork => "River Network",
            WindowKind::OperationalRight => "Operational Rights",
            WindowKind::Map => "Map",
            WindowKind::Network => "Network Diagram",
            WindowKind::AddNode => "Add Node",
            WindowKind::QueryTool => "Query Tool",
            WindowKind::GraphingTool => "Graphing Tool",
            WindowKind::RunReport => "Run Report",
            WindowKind::RunSimulation => "Run Simulation",
            WindowKind::Main => "Main",
        }
    }

    fn slot_index(self) -> usize {
        self as usize
    }
}

/// Opaque handle to a live window instance
///
/// Implemented by the toolkit layer. `dispose` must be idempotent; the
/// registry is the sole owner and guarantees it never hands out a handle
/// after disposing it.
pub trait WindowHandle {
    /// Which slot this window belongs to
    fn kind(&self) -> WindowKind;
    /// Raise the window above its siblings
    fn bring_to_front(&self);
    /// Show or hide the window (also restores from minimized state)
    fn set_visible(&self, visible: bool);
    /// Release the window's resources; safe to call more than once
    fn dispose(&self);
    /// Rebuild derived display state (title, dirty indicator)
    ///
    /// Only the main window does anything here.
    fn refresh_display_state(&self) {}
}

/// Per-kind window constructor, implemented by the editor layer
pub trait WindowFactory {
    /// Construct a new window of `kind` over the shared dataset
    ///
    /// A factory asked for a kind it cannot build is a programming error
    /// and should panic; the kind catalog is closed and compiled in.
    fn create(&self, kind: WindowKind, dataset: SharedDataset) -> Rc<dyn WindowHandle>;
}

/// One registry slot; open iff it holds a handle
struct WindowSlot {
    kind: WindowKind,
    handle: Option<Rc<dyn WindowHandle>>,
}

/// The window lifecycle registry
pub struct WindowRegistry {
    slots: Vec<WindowSlot>,
    factory: Box<dyn WindowFactory>,
    dataset: SharedDataset,
    companion: Option<SharedDataset>,
}

impl WindowRegistry {
    /// Create a registry with every slot closed
    pub fn new(factory: Box<dyn WindowFactory>, dataset: SharedDataset) -> Self {
        Self {
            slots: WindowKind::ALL
                .iter()
                .map(|&kind| WindowSlot { kind, handle: None })
                .collect(),
            factory,
            dataset,
            companion: None,
        }
    }

    /// Whether a window of this kind is currently open
    pub fn is_open(&self, kind: WindowKind) -> bool {
        self.slots[kind.slot_index()].handle.is_some()
    }

    /// Handle of the open window of this kind, if any
    pub fn handle(&self, kind: WindowKind) -> Option<Rc<dyn WindowHandle>> {
        self.slots[kind.slot_index()].handle.clone()
    }

    /// Open a window of `kind`, or bring the existing one to the front
    ///
    /// Idempotent: a second open without an intervening close returns the
    /// same instance and constructs nothing.
    pub fn open(&mut self, kind: WindowKind) -> Rc<dyn WindowHandle> {
        if let Some(handle) = self.handle(kind) {
            log::debug!("{} window already open, bringing to front", kind.label());
            handle.set_visible(true);
            handle.bring_to_front();
            return handle;
        }
        let handle = self.factory.create(kind, Rc::clone(&self.dataset));
        assert_eq!(
            handle.kind(),
            kind,
            "window factory built a {:?} window for the {:?} slot",
            handle.kind(),
            kind
        );
        log::info!("{} window opened", kind.label());
        self.slots[kind.slot_index()].handle = Some(Rc::clone(&handle));
        handle
    }

    /// Close the window of `kind`; no-op when already closed
    pub fn close(&mut self, kind: WindowKind) {
        let Some(handle) = self.slots[kind.slot_index()].handle.take() else {
            return;
        };
        handle.set_visible(false);
        handle.dispose();
        log::info!("{} window closed", kind.label());
    }

    /// Close and conditionally reopen a window, reloading it from the
    /// dataset
    ///
    /// Reopens when the window was open or `force_open` is set; otherwise
    /// the slot stays closed. Returns the fresh handle when reopened.
    pub fn refresh(&mut self, kind: WindowKind, force_open: bool) -> Option<Rc<dyn WindowHandle>> {
        let was_open = self.is_open(kind);
        self.close(kind);
        if was_open || force_open {
            Some(self.open(kind))
        } else {
            None
        }
    }

    /// Close every window except the main one, in declared order
    ///
    /// The fixed order guarantees dependent windows never outlive the main
    /// window they read from.
    pub fn close_all(&mut self) {
        let kinds: Vec<WindowKind> = self.slots.iter().map(|slot| slot.kind).collect();
        for kind in kinds {
            if kind != WindowKind::Main {
                self.close(kind);
            }
        }
    }

    /// The shared dataset reference lent to windows and the engine
    pub fn dataset(&self) -> SharedDataset {
        Rc::clone(&self.dataset)
    }

    /// The secondary companion dataset, when one is attached
    pub fn companion_dataset(&self) -> Option<SharedDataset> {
        self.companion.clone()
    }

    /// Replace the shared dataset reference
    ///
    /// Deliberately does not close or invalidate open windows: a full
    /// reset is a two-step protocol, `close_all()` then `set_dataset()`.
    /// Windows left open keep the dataset reference they were constructed
    /// with until refreshed.
    pub fn set_dataset(&mut self, dataset: SharedDataset) {
        log::info!(
            "dataset reference replaced ('{}')",
            dataset.borrow().name()
        );
        self.dataset = dataset;
    }

    /// Attach or replace the companion dataset reference
    pub fn set_companion_dataset(&mut self, dataset: Option<SharedDataset>) {
        self.companion = dataset;
    }

    /// Tell the main window its derived display state is stale
    ///
    /// No-op for every other kind and when the main window is closed.
    pub fn notify_status_changed(&self, kind: WindowKind) {
        if kind != WindowKind::Main {
            return;
        }
        if let Some(handle) = self.handle(WindowKind::Main) {
            handle.refresh_display_state();
        }
    }
}
