use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, MouseEventKind};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Block;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use tui_tree_list::{LoadRequest, Node, SimpleRow, TreeHost, TreeList, Updates};

type Row = SimpleRow<'static, String>;
type Loaded = (LoadRequest<String>, Result<Vec<Node<Row>>, String>);

fn folder(name: &str) -> Node<Row> {
    Node::lazy(SimpleRow::section(name.to_owned(), format!("{name}/")))
}

fn file(name: &str) -> Node<Row> {
    Node::new(SimpleRow::row(name.to_owned(), name.to_owned()))
}

fn top_level(generation: usize) -> Vec<Node<Row>> {
    let mut items = vec![
        folder("src"),
        folder("tests"),
        file("Cargo.toml"),
        file("README.md"),
    ];
    let len = items.len();
    items.rotate_left(generation % len);
    if generation % 2 == 1 {
        items.push(file("CHANGELOG.md"));
    }
    items
}

/// Pretends to read a folder from a slow disk.
fn load(request: &LoadRequest<String>, fail: bool) -> Result<Vec<Node<Row>>, String> {
    std::thread::sleep(Duration::from_millis(300));
    if fail {
        return Err("permission denied".to_owned());
    }
    let depth = request.identifier().len();
    let prefix = request.identifier().join("/");
    Ok((0..3)
        .map(|index| {
            let name = format!("{}-{index}", request.identifier()[depth - 1]);
            if depth < 3 && index == 0 {
                folder(&name)
            } else {
                file(&name)
            }
        })
        .chain(std::iter::once(file(&format!("{prefix}.rs"))))
        .collect())
}

struct App {
    host: TreeHost<Row>,
    generation: usize,
    fail_next: bool,
    status: String,
    sender: mpsc::Sender<Loaded>,
    receiver: mpsc::Receiver<Loaded>,
}

impl App {
    fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            host: TreeHost::new(top_level(0)).expect("all item identifiers are unique"),
            generation: 0,
            fail_next: false,
            status: String::new(),
            sender,
            receiver,
        }
    }

    /// Start a loader thread for every requested folder.
    fn handle(&mut self, updates: &Updates<String>) {
        if !updates.is_empty() {
            self.status = format!("{:?}", updates.commands());
        }
        for request in updates.load_requests() {
            let request = request.clone();
            let sender = self.sender.clone();
            let fail = std::mem::take(&mut self.fail_next);
            std::thread::spawn(move || {
                let result = load(&request, fail);
                _ = sender.send((request, result));
            });
        }
    }

    fn receive(&mut self) {
        while let Ok((request, result)) = self.receiver.try_recv() {
            match self.host.complete_load(&request, result) {
                Ok(updates) => self.handle(&updates),
                Err(err) => self.status = err.to_string(),
            }
        }
    }

    fn refresh(&mut self) {
        self.generation += 1;
        match self.host.set_items(top_level(self.generation)) {
            Ok(updates) => self.handle(&updates),
            Err(err) => self.status = err.to_string(),
        }
    }
}

fn main() -> std::io::Result<()> {
    // Logs go to a file as the terminal is busy
    let log = std::fs::File::create("example.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::sync::Mutex::new(log))
        .with_ansi(false)
        .init();

    // Terminal initialization
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // App
    let app = App::new();
    let res = run_app(&mut terminal, app);

    // restore terminal
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> std::io::Result<()> {
    loop {
        app.receive();
        terminal.draw(|frame| {
            let area = frame.size();
            let widget = TreeList::new(SimpleRow::templates())
                .block(
                    Block::bordered()
                        .title("Tree List (r refresh, f fail next load, q quit)")
                        .title_bottom(app.status.clone()),
                )
                .highlight_style(
                    Style::new()
                        .fg(Color::Black)
                        .bg(Color::LightGreen)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol(">> ");
            frame.render_stateful_widget(widget, area, &mut app.host);
        })?;

        if !crossterm::event::poll(Duration::from_millis(50))? {
            continue;
        }
        let updates = match crossterm::event::read()? {
            Event::Key(key) => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('r') => {
                    app.refresh();
                    continue;
                }
                KeyCode::Char('f') => {
                    app.fail_next = true;
                    continue;
                }
                KeyCode::Char('\n' | ' ') => app.host.toggle_selected(),
                KeyCode::Left => app.host.key_left(),
                KeyCode::Right => app.host.key_right(),
                KeyCode::Down => {
                    app.host.key_down();
                    continue;
                }
                KeyCode::Up => {
                    app.host.key_up();
                    continue;
                }
                KeyCode::Home => {
                    app.host.select_first();
                    continue;
                }
                KeyCode::End => {
                    app.host.select_last();
                    continue;
                }
                KeyCode::PageDown => {
                    app.host.scroll_down(3);
                    continue;
                }
                KeyCode::PageUp => {
                    app.host.scroll_up(3);
                    continue;
                }
                _ => continue,
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => {
                    app.host.scroll_down(1);
                    continue;
                }
                MouseEventKind::ScrollUp => {
                    app.host.scroll_up(1);
                    continue;
                }
                _ => continue,
            },
            _ => continue,
        };
        app.handle(&updates);
    }
}
