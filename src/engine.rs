//! Pointer interaction engine for the canvas.
//!
//! Translates pointer-down / move / up / leave events (in screen space) into graph
//! mutations. Exactly one of panning, node dragging or connector dragging can be open at a
//! time; which one starts is decided by hit-testing the pointer-down position against
//! mutually exclusive regions (handle, node body, background).

use crate::constants::HANDLE_HIT_RADIUS;
use crate::graph::Graph;
use crate::session::EditorSession;
use crate::templates::NodeTemplate;
use crate::transform;
use crate::types::*;
use eframe::egui;

/// What lies under a canvas point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    /// Empty canvas
    Background,
    /// The body of a node
    NodeBody(NodeId),
    /// An outgoing handle offered by the node's kind
    SourceHandle {
        /// Node owning the handle
        node: NodeId,
        /// `None` for the unnamed handle, otherwise the condition branch
        handle: Option<Branch>,
    },
    /// The incoming handle of a node
    TargetHandle(NodeId),
}

/// A node being moved.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMove {
    /// Node being dragged
    pub node_id: NodeId,
    /// Position before the drag started
    pub original: Position,
    /// Screen position of the pointer-down
    pub start_screen: egui::Pos2,
}

impl NodeMove {
    /// Node position for the pointer at `screen`: the screen delta scaled back to canvas
    /// units, rounded to whole units.
    pub fn position_for(&self, screen: egui::Pos2, zoom: f32) -> Position {
        let delta = screen - self.start_screen;
        self.original
            .offset(delta.x / zoom, delta.y / zoom)
            .rounded()
    }
}

/// A connector being dragged out of a source handle.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorLink {
    /// Node the connector leaves from
    pub source: NodeId,
    /// Handle the connector leaves from
    pub handle: Option<Branch>,
    /// Live pointer position in canvas space
    pub pointer: Position,
}

/// Interaction state machine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    /// No pointer gesture in progress
    #[default]
    Idle,
    /// Dragging the canvas background
    PanningCanvas {
        /// Pointer position at the last applied pan step
        last_screen: egui::Pos2,
    },
    /// Moving a node
    DraggingNode(NodeMove),
    /// Drawing a new edge
    DraggingConnector(ConnectorLink),
}

impl Interaction {
    /// Returns true when no gesture is open.
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }
}

/// Result of finishing a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Nothing was open, or the gesture changed nothing
    None,
    /// The canvas was panned
    Panned,
    /// A node ended up at a new position
    NodeMoved(NodeId),
    /// A connector was dropped on a valid target
    EdgeAdded(EdgeId),
    /// A connector was released elsewhere or refused; the graph is untouched
    Abandoned,
}

/// Finds what lies under `point` (canvas space).
///
/// Regions are tested in priority order across the whole graph: source handles, then
/// target handles, then node bodies. Within each pass the topmost node wins. Only handles
/// the node's kind actually has are hit-testable.
pub fn hit_test(graph: &Graph, point: Position, zoom: f32) -> HitTarget {
    let radius = HANDLE_HIT_RADIUS / zoom;
    let topmost_first = || graph.nodes().iter().rev();

    for node in topmost_first() {
        for &handle in node.kind.source_handles() {
            let hit = node
                .source_anchor(handle)
                .is_some_and(|anchor| anchor.distance(point) <= radius);
            if hit {
                return HitTarget::SourceHandle {
                    node: node.id.clone(),
                    handle,
                };
            }
        }
    }
    for node in topmost_first() {
        let hit = node
            .target_anchor()
            .is_some_and(|anchor| anchor.distance(point) <= radius);
        if hit {
            return HitTarget::TargetHandle(node.id.clone());
        }
    }
    topmost_first()
        .find(|node| node.contains(point))
        .map_or(HitTarget::Background, |node| HitTarget::NodeBody(node.id.clone()))
}

impl EditorSession {
    /// Primary button pressed at `screen`.
    ///
    /// Returns what was hit, or `None` when a gesture is already open and the press is
    /// ignored. Pressing a target handle starts nothing.
    pub fn pointer_down(&mut self, screen: egui::Pos2) -> Option<HitTarget> {
        if !self.interaction.is_idle() {
            log::debug!("pointer down ignored while {:?} is open", self.interaction);
            return None;
        }
        let point = self.to_canvas(screen);
        let hit = hit_test(&self.graph, point, self.view.zoom());
        self.interaction = match &hit {
            HitTarget::Background => Interaction::PanningCanvas {
                last_screen: screen,
            },
            HitTarget::NodeBody(id) => match self.graph.node(id) {
                Some(node) => Interaction::DraggingNode(NodeMove {
                    node_id: id.clone(),
                    original: node.position,
                    start_screen: screen,
                }),
                None => Interaction::Idle,
            },
            HitTarget::SourceHandle { node, handle } => {
                Interaction::DraggingConnector(ConnectorLink {
                    source: node.clone(),
                    handle: *handle,
                    pointer: point,
                })
            }
            HitTarget::TargetHandle(_) => Interaction::Idle,
        };
        Some(hit)
    }

    /// Pointer moved to `screen` while the primary button is held.
    pub fn pointer_move(&mut self, screen: egui::Pos2) {
        match &mut self.interaction {
            Interaction::Idle => {}
            Interaction::PanningCanvas { last_screen } => {
                let delta = screen - *last_screen;
                *last_screen = screen;
                self.view.pan_by(delta.x, delta.y);
            }
            Interaction::DraggingNode(node_move) => {
                let position = node_move.position_for(screen, self.view.zoom());
                if let Err(err) = self.graph.move_node(&node_move.node_id, position) {
                    log::warn!("dragged node vanished: {err}");
                }
            }
            Interaction::DraggingConnector(link) => {
                link.pointer = transform::to_canvas(screen, &self.viewport, &self.view);
            }
        }
    }

    /// Primary button released at `screen`; closes the open gesture.
    pub fn pointer_up(&mut self, screen: egui::Pos2) -> DragOutcome {
        match std::mem::take(&mut self.interaction) {
            Interaction::Idle => DragOutcome::None,
            Interaction::PanningCanvas { last_screen } => {
                let delta = screen - last_screen;
                self.view.pan_by(delta.x, delta.y);
                DragOutcome::Panned
            }
            Interaction::DraggingNode(node_move) => {
                let position = node_move.position_for(screen, self.view.zoom());
                match self.graph.move_node(&node_move.node_id, position) {
                    Ok(()) if position != node_move.original => {
                        DragOutcome::NodeMoved(node_move.node_id)
                    }
                    Ok(()) => DragOutcome::None,
                    Err(err) => {
                        log::warn!("dragged node vanished: {err}");
                        DragOutcome::Abandoned
                    }
                }
            }
            Interaction::DraggingConnector(link) => {
                let point = self.to_canvas(screen);
                match hit_test(&self.graph, point, self.view.zoom()) {
                    HitTarget::TargetHandle(target) => {
                        match self.graph.add_edge(&link.source, link.handle, &target) {
                            Ok(id) => DragOutcome::EdgeAdded(id),
                            Err(err) => {
                                log::debug!("connector refused: {err}");
                                DragOutcome::Abandoned
                            }
                        }
                    }
                    _ => DragOutcome::Abandoned,
                }
            }
        }
    }

    /// Pointer left the canvas or the window.
    ///
    /// Panning stops, a dragged node stays where it was last drawn, and a connector is
    /// abandoned.
    pub fn pointer_leave(&mut self) -> DragOutcome {
        match std::mem::take(&mut self.interaction) {
            Interaction::Idle => DragOutcome::None,
            Interaction::PanningCanvas { .. } => DragOutcome::Panned,
            Interaction::DraggingNode(node_move) => {
                let moved = self
                    .graph
                    .node(&node_move.node_id)
                    .is_some_and(|node| node.position != node_move.original);
                if moved {
                    DragOutcome::NodeMoved(node_move.node_id)
                } else {
                    DragOutcome::None
                }
            }
            Interaction::DraggingConnector(_) => DragOutcome::Abandoned,
        }
    }

    /// A palette item was released at `screen`. Creates a node there if the point is on
    /// the canvas.
    pub fn drop_template(&mut self, template: &NodeTemplate, screen: egui::Pos2) -> Option<NodeId> {
        if !self.viewport.contains(screen) {
            log::debug!("palette drop outside the canvas ignored");
            return None;
        }
        let position = self.to_canvas(screen);
        Some(self.graph.add_node(template, position))
    }

    /// Endpoints of the connector preview, in canvas space: handle anchor and pointer.
    pub fn connector_preview(&self) -> Option<(Position, Position)> {
        let Interaction::DraggingConnector(link) = &self.interaction else {
            return None;
        };
        let anchor = self.graph.node(&link.source)?.source_anchor(link.handle)?;
        Some((anchor, link.pointer))
    }

    /// Target handle under the live connector, and whether dropping there would be accepted.
    pub fn connector_hover(&self) -> Option<(NodeId, bool)> {
        let Interaction::DraggingConnector(link) = &self.interaction else {
            return None;
        };
        match hit_test(&self.graph, link.pointer, self.view.zoom()) {
            HitTarget::TargetHandle(target) => {
                let accepted = self
                    .graph
                    .check_edge(&link.source, link.handle, &target)
                    .is_ok();
                Some((target, accepted))
            }
            _ => None,
        }
    }

    /// Node currently being dragged, if any.
    pub fn dragged_node(&self) -> Option<&str> {
        match &self.interaction {
            Interaction::DraggingNode(node_move) => Some(node_move.node_id.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates;
    use crate::transform::Viewport;
    use crate::view::ViewState;

    fn template(kind: NodeKind, subtype: &str) -> &'static NodeTemplate {
        templates::find(kind, subtype).expect("template exists")
    }

    fn session_with_viewport() -> EditorSession {
        let mut session = EditorSession::new();
        session.set_viewport(Viewport {
            origin: egui::pos2(100.0, 50.0),
            size: egui::vec2(1600.0, 900.0),
        });
        session.view.pan_by(20.0, 10.0);
        session
    }

    #[test]
    fn hit_test_regions_are_exclusive() {
        let mut graph = Graph::new();
        let condition = graph.add_node(
            template(NodeKind::Condition, "tag_equals"),
            Position::new(0.0, 0.0),
        );

        assert_eq!(
            hit_test(&graph, Position::new(240.0, 12.0), 1.0),
            HitTarget::SourceHandle {
                node: condition.clone(),
                handle: Some(Branch::True)
            }
        );
        assert_eq!(
            hit_test(&graph, Position::new(242.0, 37.0), 1.0),
            HitTarget::SourceHandle {
                node: condition.clone(),
                handle: Some(Branch::False)
            }
        );
        assert_eq!(
            hit_test(&graph, Position::new(1.0, 24.0), 1.0),
            HitTarget::TargetHandle(condition.clone())
        );
        assert_eq!(
            hit_test(&graph, Position::new(120.0, 24.0), 1.0),
            HitTarget::NodeBody(condition)
        );
        assert_eq!(
            hit_test(&graph, Position::new(500.0, 500.0), 1.0),
            HitTarget::Background
        );
    }

    #[test]
    fn leaf_and_root_offer_no_illegal_handles() {
        let mut graph = Graph::new();
        let action = graph.add_node(template(NodeKind::Action, "add_tag"), Position::new(0.0, 0.0));
        // Where a source handle would be on an action there is only the node edge.
        assert_eq!(
            hit_test(&graph, Position::new(240.0, 24.0), 1.0),
            HitTarget::NodeBody(action)
        );

        let mut graph = Graph::new();
        let trigger = graph.add_node(
            template(NodeKind::Trigger, "tag_added"),
            Position::new(0.0, 0.0),
        );
        assert_eq!(
            hit_test(&graph, Position::new(0.0, 24.0), 1.0),
            HitTarget::NodeBody(trigger)
        );
    }

    #[test]
    fn handles_win_over_bodies_of_other_nodes() {
        let mut graph = Graph::new();
        let trigger = graph.add_node(
            template(NodeKind::Trigger, "tag_added"),
            Position::new(0.0, 0.0),
        );
        // Drawn on top of the trigger's source handle.
        graph.add_node(template(NodeKind::Action, "add_tag"), Position::new(200.0, 0.0));

        assert_eq!(
            hit_test(&graph, Position::new(240.0, 24.0), 1.0),
            HitTarget::SourceHandle {
                node: trigger,
                handle: None
            }
        );
    }

    #[test]
    fn hit_radius_scales_with_zoom() {
        let mut graph = Graph::new();
        graph.add_node(template(NodeKind::Trigger, "tag_added"), Position::new(0.0, 0.0));
        // 12 canvas units right of the source anchor: outside at zoom 1, inside at zoom 0.5.
        let point = Position::new(252.0, 24.0);
        assert_eq!(hit_test(&graph, point, 1.0), HitTarget::Background);
        assert!(matches!(
            hit_test(&graph, point, 0.5),
            HitTarget::SourceHandle { .. }
        ));
    }

    #[test]
    fn background_drag_pans_canvas() {
        let mut session = session_with_viewport();
        let start = egui::pos2(400.0, 400.0);

        assert_eq!(session.pointer_down(start), Some(HitTarget::Background));
        assert!(matches!(
            session.interaction(),
            Interaction::PanningCanvas { .. }
        ));

        session.pointer_move(egui::pos2(410.0, 395.0));
        session.pointer_move(egui::pos2(430.0, 390.0));
        assert_eq!(session.view.pan, egui::vec2(50.0, 0.0));

        assert_eq!(session.pointer_up(egui::pos2(431.0, 390.0)), DragOutcome::Panned);
        assert_eq!(session.view.pan, egui::vec2(51.0, 0.0));
        assert!(session.interaction().is_idle());
    }

    #[test]
    fn node_drag_is_zoom_invariant() {
        for (zoom, expected) in [
            (0.5, Position::new(220.0, 40.0)),
            (1.0, Position::new(160.0, 70.0)),
            (2.0, Position::new(130.0, 85.0)),
        ] {
            let mut session = session_with_viewport();
            session.view = ViewState::new(zoom, session.view.pan);
            let id = session
                .graph
                .add_node(template(NodeKind::Action, "send_email"), Position::new(100.0, 100.0));

            let grab = session.to_screen(Position::new(220.0, 124.0));
            assert_eq!(session.pointer_down(grab), Some(HitTarget::NodeBody(id.clone())));
            assert_eq!(session.dragged_node(), Some(id.as_str()));

            let release = grab + egui::vec2(60.0, -30.0);
            session.pointer_move(release);
            assert_eq!(session.graph.node(&id).unwrap().position, expected);

            assert_eq!(session.pointer_up(release), DragOutcome::NodeMoved(id.clone()));
            assert_eq!(session.graph.node(&id).unwrap().position, expected, "zoom {zoom}");
        }
    }

    #[test]
    fn node_drag_rounds_to_whole_units() {
        let mut session = session_with_viewport();
        session.view = ViewState::new(3.0, session.view.pan);
        let id = session
            .graph
            .add_node(template(NodeKind::Action, "add_tag"), Position::new(0.0, 0.0));

        let grab = session.to_screen(Position::new(100.0, 20.0));
        session.pointer_down(grab);
        session.pointer_up(grab + egui::vec2(10.0, 4.0));

        // 10 / 3 = 3.33 -> 3, 4 / 3 = 1.33 -> 1
        assert_eq!(session.graph.node(&id).unwrap().position, Position::new(3.0, 1.0));
    }

    #[test]
    fn click_without_movement_reports_nothing() {
        let mut session = session_with_viewport();
        let id = session
            .graph
            .add_node(template(NodeKind::Action, "add_tag"), Position::new(0.0, 0.0));
        let grab = session.to_screen(Position::new(100.0, 20.0));

        assert_eq!(session.pointer_down(grab), Some(HitTarget::NodeBody(id)));
        assert_eq!(session.pointer_up(grab), DragOutcome::None);
    }

    #[test]
    fn connector_released_on_background_is_abandoned() {
        let mut session = session_with_viewport();
        let trigger = session
            .graph
            .add_node(template(NodeKind::Trigger, "tag_added"), Position::new(0.0, 0.0));
        session
            .graph
            .add_node(template(NodeKind::Action, "add_tag"), Position::new(400.0, 0.0));

        let handle = session.to_screen(Position::new(240.0, 24.0));
        assert_eq!(
            session.pointer_down(handle),
            Some(HitTarget::SourceHandle {
                node: trigger,
                handle: None
            })
        );

        let elsewhere = session.to_screen(Position::new(300.0, 300.0));
        session.pointer_move(elsewhere);
        let (from, to) = session.connector_preview().expect("preview while dragging");
        assert_eq!(from, Position::new(240.0, 24.0));
        assert!(to.distance(Position::new(300.0, 300.0)) < 1e-3);

        assert_eq!(session.pointer_up(elsewhere), DragOutcome::Abandoned);
        assert!(session.graph.edges().is_empty());
        assert!(session.connector_preview().is_none());
    }

    #[test]
    fn connector_refused_by_graph_is_abandoned() {
        let mut session = session_with_viewport();
        let trigger = session
            .graph
            .add_node(template(NodeKind::Trigger, "tag_added"), Position::new(0.0, 0.0));
        let action = session
            .graph
            .add_node(template(NodeKind::Action, "add_tag"), Position::new(400.0, 0.0));
        session.graph.add_edge(&trigger, None, &action).unwrap();

        let handle = session.to_screen(Position::new(240.0, 24.0));
        let target = session.to_screen(Position::new(400.0, 24.0));
        session.pointer_down(handle);
        session.pointer_move(target);
        assert_eq!(session.connector_hover(), Some((action, false)));

        assert_eq!(session.pointer_up(target), DragOutcome::Abandoned);
        assert_eq!(session.graph.edges().len(), 1);
    }

    #[test]
    fn pointer_leave_closes_any_gesture() {
        let mut session = session_with_viewport();
        let trigger_id = session
            .graph
            .add_node(template(NodeKind::Trigger, "tag_added"), Position::new(0.0, 0.0));

        // Connector: abandoned.
        session.pointer_down(session.to_screen(Position::new(240.0, 24.0)));
        assert_eq!(session.pointer_leave(), DragOutcome::Abandoned);
        assert!(session.interaction().is_idle());
        assert!(session.graph.edges().is_empty());

        // Node drag: keeps the last live position.
        let grab = session.to_screen(Position::new(100.0, 20.0));
        session.pointer_down(grab);
        session.pointer_move(grab + egui::vec2(15.0, 5.0));
        assert_eq!(session.pointer_leave(), DragOutcome::NodeMoved(trigger_id.clone()));
        assert_eq!(
            session.graph.node(&trigger_id).unwrap().position,
            Position::new(15.0, 5.0)
        );

        // Pan: closed.
        session.pointer_down(egui::pos2(1000.0, 800.0));
        assert_eq!(session.pointer_leave(), DragOutcome::Panned);
        assert!(session.interaction().is_idle());
    }

    #[test]
    fn second_pointer_down_is_ignored_while_dragging() {
        let mut session = session_with_viewport();
        session.pointer_down(egui::pos2(900.0, 700.0));
        assert_eq!(session.pointer_down(egui::pos2(901.0, 700.0)), None);
        assert!(matches!(
            session.interaction(),
            Interaction::PanningCanvas { .. }
        ));
    }

    #[test]
    fn target_handle_press_starts_nothing() {
        let mut session = session_with_viewport();
        let action = session
            .graph
            .add_node(template(NodeKind::Action, "add_tag"), Position::new(0.0, 0.0));
        let hit = session.pointer_down(session.to_screen(Position::new(0.0, 24.0)));
        assert_eq!(hit, Some(HitTarget::TargetHandle(action)));
        assert!(session.interaction().is_idle());
    }

    #[test]
    fn palette_drop_outside_canvas_is_ignored() {
        let mut session = session_with_viewport();
        let trigger = template(NodeKind::Trigger, "contact_created");
        assert_eq!(session.drop_template(trigger, egui::pos2(10.0, 10.0)), None);
        assert!(session.graph.is_empty());
    }

    #[test]
    fn builds_trigger_condition_action_graph() {
        let mut session = session_with_viewport();

        // Drop a trigger and a condition from the palette.
        let at = session.to_screen(Position::new(50.0, 150.0));
        let trigger = session
            .drop_template(template(NodeKind::Trigger, "contact_created"), at)
            .expect("dropped on canvas");
        let at = session.to_screen(Position::new(350.0, 100.0));
        let condition = session
            .drop_template(template(NodeKind::Condition, "tag_equals"), at)
            .expect("dropped on canvas");
        assert_eq!(session.graph.node(&trigger).unwrap().position, Position::new(50.0, 150.0));
        assert_eq!(
            session.graph.node(&condition).unwrap().data,
            template(NodeKind::Condition, "tag_equals").default_data
        );

        // Trigger source handle -> condition target handle.
        session.pointer_down(session.to_screen(Position::new(290.0, 174.0)));
        session.pointer_move(session.to_screen(Position::new(320.0, 140.0)));
        let outcome = session.pointer_up(session.to_screen(Position::new(350.0, 124.0)));
        assert!(matches!(outcome, DragOutcome::EdgeAdded(_)));

        assert_eq!(session.graph.nodes().len(), 2);
        assert_eq!(session.graph.edges().len(), 1);
        assert_eq!(session.graph.edges()[0].source, trigger);
        assert_eq!(session.graph.edges()[0].target, condition);
        assert_eq!(session.graph.edges()[0].source_handle, None);

        // Condition "true" handle -> new action.
        let at = session.to_screen(Position::new(650.0, 60.0));
        let action = session
            .drop_template(template(NodeKind::Action, "create_task"), at)
            .expect("dropped on canvas");
        session.pointer_down(session.to_screen(Position::new(590.0, 112.0)));
        session.pointer_move(session.to_screen(Position::new(640.0, 90.0)));
        assert_eq!(session.connector_hover(), None);
        session.pointer_move(session.to_screen(Position::new(650.0, 84.0)));
        assert_eq!(session.connector_hover(), Some((action.clone(), true)));
        let outcome = session.pointer_up(session.to_screen(Position::new(650.0, 84.0)));
        assert!(matches!(outcome, DragOutcome::EdgeAdded(_)));

        assert_eq!(session.graph.nodes().len(), 3);
        assert_eq!(session.graph.edges().len(), 2);
        let second = &session.graph.edges()[1];
        assert_eq!(second.source, condition);
        assert_eq!(second.target, action);
        assert_eq!(second.source_handle, Some(Branch::True));
    }
}
