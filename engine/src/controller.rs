use std::{collections::HashMap, fmt};

use crossing_core::{
    Board, ControllerKind, GameEvent, ImageKey, Key, Phase, PhaseMessage, Transition, Trigger,
};
use crossing_world::{Objects, Scope};

use crate::{Clock, EngineError, EventBus};

/// Input delivered to a controller's binding table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    /// A key press, in the order the backend observed it.
    Key(Key),
    /// An event drained from the bus.
    Event(GameEvent),
}

impl Signal {
    /// Triggers this signal answers to, in lookup order.
    ///
    /// Printable characters match both their own key binding and the
    /// catch-all [`Trigger::Text`] binding.
    #[must_use]
    pub fn triggers(&self) -> Vec<Trigger> {
        match self {
            Self::Key(key @ Key::Char(_)) => vec![Trigger::Key(*key), Trigger::Text],
            Self::Key(key) => vec![Trigger::Key(*key)],
            Self::Event(event) => vec![Trigger::Event(event.name())],
        }
    }

    /// The key behind this signal, if any.
    #[must_use]
    pub const fn key(&self) -> Option<Key> {
        match self {
            Self::Key(key) => Some(*key),
            Self::Event(_) => None,
        }
    }

    /// The event behind this signal, if any.
    #[must_use]
    pub const fn event(&self) -> Option<&GameEvent> {
        match self {
            Self::Key(_) => None,
            Self::Event(event) => Some(event),
        }
    }
}

/// Handler stored in a binding table.
pub type Handler<C> = fn(&mut C, &Signal, &mut Context) -> Result<(), EngineError>;

/// Per-instance table from trigger to handler.
pub struct Bindings<C> {
    table: HashMap<Trigger, Handler<C>>,
}

impl<C> Bindings<C> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Binds `handler` to `trigger`, replacing any previous binding.
    #[must_use]
    pub fn on(mut self, trigger: impl Into<Trigger>, handler: Handler<C>) -> Self {
        let _ = self.table.insert(trigger.into(), handler);
        self
    }

    /// Handler bound to `trigger`, if any.
    #[must_use]
    pub fn handler(&self, trigger: &Trigger) -> Option<Handler<C>> {
        self.table.get(trigger).copied()
    }

    /// Returns `true` when `trigger` is bound.
    #[must_use]
    pub fn contains(&self, trigger: &Trigger) -> bool {
        self.table.contains_key(trigger)
    }

    /// Number of bound triggers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` when nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl<C> Default for Bindings<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Bindings<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut triggers: Vec<_> = self
            .table
            .keys()
            .map(|trigger| format!("{trigger:?}"))
            .collect();
        triggers.sort();
        f.debug_struct("Bindings").field("triggers", &triggers).finish()
    }
}

/// Controllers that expose their binding table to [`dispatch`].
pub trait Bound: Sized {
    /// The controller's binding table.
    fn bindings(&self) -> &Bindings<Self>;
}

/// Looks every trigger of `signal` up in the controller's bindings and runs
/// the matching handlers. Returns whether anything matched.
pub fn dispatch<C: Bound>(
    controller: &mut C,
    signal: &Signal,
    ctx: &mut Context,
) -> Result<bool, EngineError> {
    let mut handled = false;
    for trigger in signal.triggers() {
        if let Some(handler) = controller.bindings().handler(&trigger) {
            handler(controller, signal, ctx)?;
            handled = true;
        }
    }
    Ok(handled)
}

/// Request to change phase, applied by the engine after the dispatch pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseRequest {
    /// Destination phase.
    pub phase: Phase,
    /// Soft or hard replacement of running controllers.
    pub transition: Transition,
    /// Payload handed to newly created controllers.
    pub message: PhaseMessage,
}

/// Everything a controller may touch while handling a signal or ticking.
#[derive(Debug)]
pub struct Context {
    /// Global entity registry.
    pub objects: Objects,
    /// Event queue.
    pub bus: EventBus,
    /// Frame clock.
    pub clock: Clock,
    /// Playing field geometry.
    pub board: Board,
    background: Option<ImageKey>,
    phase_requests: Vec<PhaseRequest>,
    stop_requested: bool,
    fullscreen_toggled: bool,
}

impl Context {
    /// Creates an empty context for the provided board.
    #[must_use]
    pub fn new(board: Board, clock: Clock) -> Self {
        Self {
            objects: Objects::new(),
            bus: EventBus::new(),
            clock,
            board,
            background: None,
            phase_requests: Vec::new(),
            stop_requested: false,
            fullscreen_toggled: false,
        }
    }

    /// Posts an event for the next dispatch pass.
    pub fn post(&mut self, event: GameEvent) {
        self.bus.post(event);
    }

    /// Asks the engine to change phase once the current dispatch pass ends.
    pub fn request_phase(&mut self, phase: Phase, transition: Transition, message: PhaseMessage) {
        self.phase_requests.push(PhaseRequest {
            phase,
            transition,
            message,
        });
    }

    /// Phase changes requested but not yet applied.
    #[must_use]
    pub fn phase_requests(&self) -> &[PhaseRequest] {
        &self.phase_requests
    }

    /// Takes the pending phase requests.
    pub fn take_phase_requests(&mut self) -> Vec<PhaseRequest> {
        std::mem::take(&mut self.phase_requests)
    }

    /// Asks the engine to stop at the end of the current frame.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    /// Whether a stop has been requested.
    #[must_use]
    pub const fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Asks the backend to toggle fullscreen after this frame.
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_toggled = !self.fullscreen_toggled;
    }

    pub(crate) fn take_fullscreen_toggle(&mut self) -> bool {
        std::mem::replace(&mut self.fullscreen_toggled, false)
    }

    /// Replaces the background layer.
    pub fn set_background(&mut self, image: Option<ImageKey>) {
        self.background = image;
    }

    /// Current background layer.
    #[must_use]
    pub fn background(&self) -> Option<&ImageKey> {
        self.background.as_ref()
    }
}

/// A unit of per-phase behaviour that owns a subset of entities.
pub trait Controller: fmt::Debug {
    /// Identifies the controller type for phase bookkeeping.
    fn kind(&self) -> ControllerKind;

    /// Entities owned by the controller.
    fn scope(&self) -> &Scope;

    /// Mutable access to the owned entities.
    fn scope_mut(&mut self) -> &mut Scope;

    /// One-time setup right after construction.
    fn create(&mut self, _ctx: &mut Context) -> Result<(), EngineError> {
        Ok(())
    }

    /// Runs the handlers bound to `signal`. Returns whether anything matched.
    fn dispatch(&mut self, signal: &Signal, ctx: &mut Context) -> Result<bool, EngineError>;

    /// Per-frame logic, run after the owned entities were ticked.
    fn update(&mut self, _ctx: &mut Context) -> Result<(), EngineError> {
        Ok(())
    }

    /// Ticks the owned entities, then runs [`Controller::update`].
    fn tick(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        let dt = ctx.clock.dt();
        self.scope().tick(&mut ctx.objects, dt)?;
        self.update(ctx)
    }

    /// Teardown; purges every owned entity by default.
    fn destroy(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        let _ = self.scope_mut().purge(&mut ctx.objects, None)?;
        Ok(())
    }
}

/// Builds controllers for the phases described by the phase table.
pub trait ControllerFactory {
    /// Constructs a controller of `kind`, handing it the phase message.
    fn build(
        &mut self,
        kind: ControllerKind,
        message: &PhaseMessage,
    ) -> Result<Box<dyn Controller>, EngineError>;
}

impl<F> ControllerFactory for F
where
    F: FnMut(ControllerKind, &PhaseMessage) -> Result<Box<dyn Controller>, EngineError>,
{
    fn build(
        &mut self,
        kind: ControllerKind,
        message: &PhaseMessage,
    ) -> Result<Box<dyn Controller>, EngineError> {
        self(kind, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossing_core::EventName;

    #[derive(Debug, Default)]
    struct Probe {
        seen: Vec<String>,
        bindings: Bindings<Probe>,
    }

    impl Probe {
        fn new() -> Self {
            Self {
                bindings: Bindings::new()
                    .on(Key::Char('q'), Self::on_q)
                    .on(Trigger::Text, Self::on_text)
                    .on(EventName::Win, Self::on_win),
                ..Self::default()
            }
        }

        fn on_q(&mut self, _signal: &Signal, _ctx: &mut Context) -> Result<(), EngineError> {
            self.seen.push("q".to_owned());
            Ok(())
        }

        fn on_text(&mut self, signal: &Signal, _ctx: &mut Context) -> Result<(), EngineError> {
            if let Some(Key::Char(c)) = signal.key() {
                self.seen.push(format!("text:{c}"));
            }
            Ok(())
        }

        fn on_win(&mut self, _signal: &Signal, ctx: &mut Context) -> Result<(), EngineError> {
            self.seen.push("win".to_owned());
            ctx.post(GameEvent::Reset);
            Ok(())
        }
    }

    impl Bound for Probe {
        fn bindings(&self) -> &Bindings<Self> {
            &self.bindings
        }
    }

    fn context() -> Context {
        Context::new(Board::default(), Clock::default())
    }

    #[test]
    fn characters_reach_specific_and_text_bindings() {
        let mut probe = Probe::new();
        let mut ctx = context();

        let handled = dispatch(&mut probe, &Signal::Key(Key::Char('q')), &mut ctx)
            .expect("dispatch succeeds");

        assert!(handled);
        assert_eq!(probe.seen, vec!["q".to_owned(), "text:q".to_owned()]);
    }

    #[test]
    fn unbound_signals_are_ignored() {
        let mut probe = Probe::new();
        let mut ctx = context();

        let handled =
            dispatch(&mut probe, &Signal::Key(Key::Enter), &mut ctx).expect("dispatch succeeds");

        assert!(!handled);
        assert!(probe.seen.is_empty());
    }

    #[test]
    fn handlers_post_instead_of_dispatching() {
        let mut probe = Probe::new();
        let mut ctx = context();

        let _ = dispatch(&mut probe, &Signal::Event(GameEvent::Win), &mut ctx)
            .expect("dispatch succeeds");

        assert_eq!(probe.seen, vec!["win".to_owned()]);
        assert_eq!(ctx.bus.drain(), vec![GameEvent::Reset]);
    }
}
