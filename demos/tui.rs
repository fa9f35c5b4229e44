// Hacked up from
// https://github.com/fdehau/tui-rs/blob/v0.18.0/examples/user_input.rs

use chordist::algorithm::MAX_ITEMS_PER_DAY;
use chordist::exercise::ExerciseState;
use chordist::store::YamlStore;
use chordist::theory::PitchClass;
use chordist::training::Training;

use clap::Parser;
use std::time::SystemTime;

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

use std::{error::Error, io};
use tui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans, Text},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

/// Practice the items that are due today.
#[derive(Parser, Debug)]
#[clap(long_about = None)]
struct Args {
    /// The yaml item store to practice from, created and seeded if missing.
    #[clap(short, long, default_value = "/tmp/chordist.yaml")]
    store: String,
}

/// One row of the keyboard stands in for an octave of piano keys.
fn key_to_note(c: char) -> Option<PitchClass> {
    use PitchClass::*;
    match c {
        'a' => Some(C),
        'w' => Some(Cs),
        's' => Some(D),
        'e' => Some(Ds),
        'd' => Some(E),
        'f' => Some(F),
        't' => Some(Fs),
        'g' => Some(G),
        'y' => Some(Gs),
        'h' => Some(A),
        'u' => Some(As),
        'j' => Some(B),
        _ => None,
    }
}

/// App holds the state of the application
struct App {
    /// Object that holds the session loop.
    training: Training,

    /// Show the expected notes of the current step.
    show_hint: bool,
}

impl App {
    fn state(&self) -> Option<ExerciseState> {
        self.training.exercise().map(|e| e.state())
    }

    fn on_char(&mut self, c: char) {
        match self.state() {
            Some(ExerciseState::InProgress) => {
                if c == '?' {
                    self.show_hint = !self.show_hint;
                } else if let Some(note) = key_to_note(c) {
                    self.training.play(note).expect("exercise is active");
                }
            }
            Some(ExerciseState::Fail) => {
                if c == 'r' {
                    self.training.retry().expect("exercise is active");
                }
            }
            Some(ExerciseState::Pass) => {
                let grade = match c {
                    '1' => Some(3),
                    '2' => Some(4),
                    '3' => Some(5),
                    _ => None,
                };
                if let Some(grade) = grade {
                    self.training
                        .complete(grade, SystemTime::now())
                        .expect("should persist");
                    self.show_hint = false;
                }
            }
            None => {}
        }
    }

    fn on_enter(&mut self) {
        if self.state() == Some(ExerciseState::Fail) {
            self.training
                .give_up(SystemTime::now())
                .expect("should persist");
            self.show_hint = false;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let store = YamlStore::new(&args.store)?;
    let mut training = Training::new(Box::new(store));
    training.start_session(SystemTime::now(), MAX_ITEMS_PER_DAY, &mut rand::thread_rng())?;
    let app = App {
        training,
        show_hint: false,
    };

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Now run the application.
    let res = run_app(&mut terminal, app);

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, &app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Esc => {
                    return Ok(());
                }
                KeyCode::Enter => {
                    app.on_enter();
                }
                KeyCode::Char(c) => {
                    app.on_char(c);
                }
                _ => {}
            }
        }
    }
}

/// The progress box row, one box per step, as styled spans.
fn progress_boxes(app: &App) -> Spans<'static> {
    let exercise = app.training.exercise().expect("only drawn while active");
    let failed = exercise.state() == ExerciseState::Fail;

    let mut spans = vec![];
    for i in 0..exercise.step_count() {
        let (icon, style) = if failed && exercise.current_step() == i {
            ("▣", Style::default().fg(Color::Red))
        } else if exercise.current_step() > i {
            ("▣", Style::default().fg(Color::Green))
        } else if exercise.current_step() == i {
            ("□", Style::default().fg(Color::Yellow))
        } else {
            ("□", Style::default())
        };
        spans.push(Span::styled(icon, style));
        spans.push(Span::raw(" "));
    }
    Spans::from(spans)
}

fn ui<B: Backend>(f: &mut Frame<B>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1), // help
                Constraint::Percentage(20),
                Constraint::Length(1), // exercise name
                Constraint::Length(1),
                Constraint::Length(1), // progress boxes
                Constraint::Length(1), // status
                Constraint::Length(1), // hint
                Constraint::Percentage(20),
                Constraint::Length(1), // session position
            ]
            .as_ref(),
        )
        .split(f.size());

    const NAME: usize = 2;
    const BOXES: usize = 4;
    const STATUS: usize = 5;
    const HINT: usize = 6;
    const POSITION: usize = 8;

    let msg = vec![
        Span::raw("Chordist. Keys "),
        Span::styled("awsedftgyhuj", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" play C through B, "),
        Span::styled("?", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" for a hint, "),
        Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" to exit."),
    ];
    let help_message = Paragraph::new(Text::from(Spans::from(msg)));
    f.render_widget(help_message, chunks[0]);

    let exercise = match app.training.exercise() {
        Some(e) => e,
        None => {
            // Nothing active; either an empty schedule or a finished session.
            let text = if app.training.session_length() == 0 {
                "Nothing to review today."
            } else {
                "Session complete."
            };
            let done = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::NONE));
            f.render_widget(done, chunks[NAME]);
            return;
        }
    };

    let name = Paragraph::new(format!("Exercise: {}", exercise.name()))
        .alignment(Alignment::Center);
    f.render_widget(name, chunks[NAME]);

    let boxes = Paragraph::new(Text::from(progress_boxes(app))).alignment(Alignment::Center);
    f.render_widget(boxes, chunks[BOXES]);

    let status = match exercise.state() {
        ExerciseState::Fail => Paragraph::new("FAILED. Press r to retry, Enter to give up.")
            .style(Style::default().fg(Color::Red)),
        ExerciseState::Pass => Paragraph::new("PASSED. Rate it: 1 hard, 2 good, 3 easy.")
            .style(Style::default().fg(Color::Green)),
        ExerciseState::InProgress => Paragraph::new(""),
    };
    f.render_widget(status.alignment(Alignment::Center), chunks[STATUS]);

    if app.show_hint && exercise.state() == ExerciseState::InProgress {
        let notes = exercise
            .expected()
            .iter()
            .map(|n| n.name())
            .collect::<Vec<_>>()
            .join(" ");
        let hint = Paragraph::new(format!("Expect: {notes}"))
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center);
        f.render_widget(hint, chunks[HINT]);
    }

    let position = Paragraph::new(format!(
        "Item {} of {}",
        app.training.completed() + 1,
        app.training.session_length()
    ))
    .alignment(Alignment::Right);
    f.render_widget(position, chunks[POSITION]);
}
