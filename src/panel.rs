// src/panel.rs
//! Drag-to-reposition state for the floating chat launcher.
//!
//! Document-wide move/up observation is acquired through [`PointerCapture`] when a drag
//! begins and released when the returned guard drops, either on `end_drag` or when the
//! panel itself is dropped.

use log::debug;

use crate::config::{PanelGeometry, WindowGeometry};
use crate::models::{PanelPosition, Point, ViewportSize};

/// Coordinates carried by a pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    Mouse(Point),
    /// Every active touch point; only the first one steers the panel.
    Touch(Vec<Point>),
}

impl PointerInput {
    pub fn primary(&self) -> Option<Point> {
        match self {
            PointerInput::Mouse(point) => Some(*point),
            PointerInput::Touch(points) => points.first().copied(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Down(PointerInput),
    Move(PointerInput),
    Up,
}

/// Host hook that subscribes to document-wide pointer move/up events.
///
/// The subscription lives exactly as long as the returned guard.
pub trait PointerCapture {
    type Guard;

    fn capture(&self) -> Self::Guard;
}

/// For hosts that deliver every pointer event to the panel anyway.
impl PointerCapture for () {
    type Guard = ();

    fn capture(&self) -> Self::Guard {}
}

struct DragSession<G> {
    grab_offset: Point,
    _listeners: G,
}

pub struct DraggablePanel<C: PointerCapture = ()> {
    geometry: PanelGeometry,
    capture: C,
    viewport: Option<ViewportSize>,
    position: PanelPosition,
    session: Option<DragSession<C::Guard>>,
}

impl DraggablePanel<()> {
    pub fn headless(geometry: PanelGeometry) -> Self {
        Self::new(geometry, ())
    }
}

impl<C: PointerCapture> DraggablePanel<C> {
    /// The viewport is unknown until the host has laid out; call [`initialize`] once it is.
    ///
    /// [`initialize`]: DraggablePanel::initialize
    pub fn new(geometry: PanelGeometry, capture: C) -> Self {
        Self {
            geometry,
            capture,
            viewport: None,
            position: Point::default(),
            session: None,
        }
    }

    /// First call anchors the panel near the bottom-right corner. Later calls only record
    /// the new viewport and pull the panel back inside it.
    pub fn initialize(&mut self, viewport: ViewportSize) {
        let first = self.viewport.is_none();
        self.viewport = Some(viewport);

        let target = if first {
            Point::new(
                viewport.width - self.geometry.initial_margin,
                viewport.height - self.geometry.initial_margin,
            )
        } else {
            self.position
        };
        self.position = self.clamp(target);
        debug!(
            "panel viewport {}x{}, position ({}, {})",
            viewport.width, viewport.height, self.position.x, self.position.y
        );
    }

    pub fn begin_drag(&mut self, input: &PointerInput) {
        if self.session.is_some() {
            return;
        }
        let Some(pointer) = input.primary() else {
            return;
        };

        self.session = Some(DragSession {
            grab_offset: Point::new(pointer.x - self.position.x, pointer.y - self.position.y),
            _listeners: self.capture.capture(),
        });
    }

    pub fn update_drag(&mut self, input: &PointerInput) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(pointer) = input.primary() else {
            return;
        };

        let target = Point::new(
            pointer.x - session.grab_offset.x,
            pointer.y - session.grab_offset.y,
        );
        self.position = self.clamp(target);
    }

    pub fn end_drag(&mut self) {
        self.session = None;
    }

    pub fn handle(&mut self, event: &PointerEvent) {
        match event {
            PointerEvent::Down(input) => self.begin_drag(input),
            PointerEvent::Move(input) => self.update_drag(input),
            PointerEvent::Up => self.end_drag(),
        }
    }

    pub fn position(&self) -> PanelPosition {
        self.position
    }

    pub fn viewport(&self) -> Option<ViewportSize> {
        self.viewport
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn grab_offset(&self) -> Option<Point> {
        self.session.as_ref().map(|s| s.grab_offset)
    }

    /// Origin of a window that opens beside the panel, kept `edge_inset` away from every edge.
    /// Before the viewport is known the raw offset is returned.
    pub fn anchored_window(&self, window: &WindowGeometry) -> Point {
        let x = self.position.x - window.offset_x;
        let y = self.position.y - window.offset_y;
        let Some(viewport) = self.viewport else {
            return Point::new(x, y);
        };

        let max_x = viewport.width - window.width - window.edge_inset;
        let max_y = viewport.height - window.height - window.edge_inset;
        Point::new(
            x.min(max_x).max(window.edge_inset),
            y.min(max_y).max(window.edge_inset),
        )
    }

    fn clamp(&self, target: Point) -> Point {
        match self.viewport {
            Some(viewport) => Point::new(
                target.x.min(viewport.width - self.geometry.size).max(0.0),
                target.y.min(viewport.height - self.geometry.size).max(0.0),
            ),
            None => Point::new(target.x.max(0.0), target.y.max(0.0)),
        }
    }
}
