use crate::game::InputEvent;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use std::time::Duration;

/// Everything drained from the terminal in one go, in arrival order.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct InputBatch {
    pub(crate) events: Vec<InputEvent>,
    pub(crate) resized: Option<(u16, u16)>,
}

impl InputBatch {
    fn push(&mut self, ev: Event, mouse: bool) {
        if let Event::Resize(w, h) = ev {
            self.resized = Some((w, h));
            return;
        }
        if let Some(action) = map_event(&ev, mouse) {
            self.events.push(action);
        }
    }

    /// Drops everything except quit requests.
    pub(crate) fn keep_quit_only(&mut self) {
        self.events.retain(|ev| *ev == InputEvent::Quit);
    }

    fn is_empty(&self) -> bool {
        self.events.is_empty() && self.resized.is_none()
    }
}

/// Pushes events from `next` until it reports nothing pending.
fn drain_into<F>(batch: &mut InputBatch, mouse: bool, mut next: F) -> anyhow::Result<()>
where
    F: FnMut() -> anyhow::Result<Option<Event>>,
{
    while let Some(ev) = next()? {
        batch.push(ev, mouse);
    }
    Ok(())
}

fn pending_event() -> anyhow::Result<Option<Event>> {
    if event::poll(Duration::ZERO)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

pub(crate) fn collect_input_nonblocking(mouse: bool) -> anyhow::Result<InputBatch> {
    let mut batch = InputBatch::default();
    drain_into(&mut batch, mouse, pending_event)?;
    Ok(batch)
}

/// Blocks until at least one usable event (or a resize) arrives.
pub(crate) fn wait_for_input(mouse: bool) -> anyhow::Result<InputBatch> {
    loop {
        let mut batch = InputBatch::default();
        batch.push(event::read()?, mouse);
        drain_into(&mut batch, mouse, pending_event)?;
        if !batch.is_empty() {
            return Ok(batch);
        }
    }
}

pub(crate) fn map_event(ev: &Event, mouse: bool) -> Option<InputEvent> {
    match ev {
        Event::Key(k) if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat => {
            map_key(k)
        }
        Event::Mouse(m) if mouse => match m.kind {
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
                Some(InputEvent::SetColumn(i32::from(m.column)))
            }
            _ => None,
        },
        _ => None,
    }
}

fn map_key(k: &KeyEvent) -> Option<InputEvent> {
    if k.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(InputEvent::Quit);
    }
    match k.code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(InputEvent::MoveLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(InputEvent::MoveRight),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(InputEvent::SpeedUp),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(InputEvent::SpeedDown),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(InputEvent::Restart),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(InputEvent::Quit),
        _ => None,
    }
}
