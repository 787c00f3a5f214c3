use celllab::Grid;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        MouseEvent, MouseEventKind,
    },
    execute, queue, terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Exit,
    TogglePlay,
    Step,
    Clear,
    Alternating,
    Random,
    Invert,
    /// A button went down over this grid cell
    Toggle(i32, i32),
    /// The pointer was dragged over this grid cell
    Paint(i32, i32),
    /// The button came back up
    Release,
    /// The terminal now fits a grid of this size
    Resize(i32, i32),
    Handled,
}

/// Grid cells each visible after skipping `left` columns and `top` rows
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Viewport {
    left: i32,
    top: i32,
}
impl Viewport {
    fn command(&mut self, event: Event) -> ConsoleCommand {
        match event {
            Event::Key(key) => self.key(key),
            Event::Mouse(mouse) => self.mouse(mouse),
            // the last row holds the report
            Event::Resize(cols, rows) => {
                ConsoleCommand::Resize(i32::from(cols).max(1), i32::from(rows.saturating_sub(1)).max(1))
            }
            _ => ConsoleCommand::Handled,
        }
    }

    fn key(&mut self, key: KeyEvent) -> ConsoleCommand {
        match key {
            // CTRL+C
            KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => ConsoleCommand::Exit,
            KeyEvent { code, .. } => match code {
                KeyCode::Char(' ') => ConsoleCommand::TogglePlay,
                KeyCode::Char('n') => ConsoleCommand::Step,
                KeyCode::Char('c') => ConsoleCommand::Clear,
                KeyCode::Char('a') => ConsoleCommand::Alternating,
                KeyCode::Char('r') => ConsoleCommand::Random,
                KeyCode::Char('i') => ConsoleCommand::Invert,
                // arrows to move the viewport
                KeyCode::Up => self.pan(0, -1),
                KeyCode::Down => self.pan(0, 1),
                KeyCode::Left => self.pan(-1, 0),
                KeyCode::Right => self.pan(1, 0),
                _ => ConsoleCommand::Handled,
            },
        }
    }

    fn mouse(&self, mouse: MouseEvent) -> ConsoleCommand {
        let x = self.left + i32::from(mouse.column);
        let y = self.top + i32::from(mouse.row);
        match mouse.kind {
            MouseEventKind::Down(_) => ConsoleCommand::Toggle(x, y),
            MouseEventKind::Drag(_) => ConsoleCommand::Paint(x, y),
            MouseEventKind::Up(_) => ConsoleCommand::Release,
            _ => ConsoleCommand::Handled,
        }
    }

    fn pan(&mut self, dx: i32, dy: i32) -> ConsoleCommand {
        self.left += dx;
        self.top += dy;
        ConsoleCommand::Handled
    }
}

/// Draws a grid to the terminal, one character per cell
///
/// The viewport starts at the grid origin and is panned with the arrow keys.
pub struct ConsoleRender {
    view: Viewport,
    report: String,
}
impl ConsoleRender {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), cursor::Hide, EnableMouseCapture)?;
        Ok(Self {
            view: Viewport::default(),
            report: String::new(),
        })
    }

    pub fn draw(&self, grid: &Grid) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        // the last row holds the report
        let view_rows = rows.saturating_sub(1);
        let window = grid.window(
            self.view.left,
            self.view.top,
            i32::from(cols),
            i32::from(view_rows),
        );

        let mut stdout = io::stdout();
        queue!(stdout, terminal::Clear(terminal::ClearType::All))?;
        for (x, y) in window.iter() {
            queue!(stdout, cursor::MoveTo(x as u16, y as u16))?;
            io::Write::write_all(&mut stdout, "█".as_bytes())?;
        }

        // write footer
        queue!(stdout, cursor::MoveTo(0, view_rows))?;
        io::Write::write_all(&mut stdout, self.report.as_bytes())?;

        io::Write::flush(&mut stdout)
    }

    pub fn poll_events(&mut self) -> io::Result<Option<ConsoleCommand>> {
        // make sure event is preset for us to take
        if !event::poll(std::time::Duration::from_secs(0))? {
            return Ok(None);
        }
        Ok(Some(self.view.command(event::read()?)))
    }

    pub fn set_report(&mut self, report: String) {
        self.report = report;
    }
}
impl Drop for ConsoleRender {
    fn drop(&mut self) {
        // if we can enable it, we should be able to disable it
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, cursor::Show);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::MouseButton;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn keys_map_to_commands() {
        let mut view = Viewport::default();

        assert_eq!(view.command(key(KeyCode::Char(' '))), ConsoleCommand::TogglePlay);
        assert_eq!(view.command(key(KeyCode::Char('n'))), ConsoleCommand::Step);
        assert_eq!(
            view.command(Event::Key(KeyEvent::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL
            ))),
            ConsoleCommand::Exit
        );
        assert_eq!(view.command(key(KeyCode::Char('c'))), ConsoleCommand::Clear);
    }

    #[test]
    fn clicks_land_on_panned_cells() {
        let mut view = Viewport::default();
        view.command(key(KeyCode::Right));
        view.command(key(KeyCode::Right));
        view.command(key(KeyCode::Up));

        assert_eq!(
            view.command(mouse(MouseEventKind::Down(MouseButton::Left), 3, 4)),
            ConsoleCommand::Toggle(5, 3)
        );
        assert_eq!(
            view.command(mouse(MouseEventKind::Drag(MouseButton::Left), 0, 0)),
            ConsoleCommand::Paint(2, -1)
        );
        assert_eq!(
            view.command(mouse(MouseEventKind::Up(MouseButton::Left), 0, 0)),
            ConsoleCommand::Release
        );
        assert_eq!(
            view.command(mouse(MouseEventKind::Moved, 1, 1)),
            ConsoleCommand::Handled
        );
    }

    #[test]
    fn resize_leaves_the_report_row() {
        let mut view = Viewport::default();

        assert_eq!(view.command(Event::Resize(80, 25)), ConsoleCommand::Resize(80, 24));
        assert_eq!(view.command(Event::Resize(0, 1)), ConsoleCommand::Resize(1, 1));
    }
}
