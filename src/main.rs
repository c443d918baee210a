use clap::error::ErrorKind;
use clap::Parser;
use iced::widget::{button, column, container, image, row, scrollable, text, text_input, Column};
use iced::{keyboard, Alignment, Element, Length, Subscription, Task, Theme};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::task;

mod config;
mod error;
mod logging;
mod metadata;
mod state;
mod ui;

use config::Config;
use metadata::{ExifTool, MetadataStore};
use state::session::{AfterWrite, LoadTicket, Session, TagState, WriteRequest};
use ui::preview::{self, Preview};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "pic-tagger", version, about = "Browse a folder of photos and edit their keyword tags")]
struct Cli {
    /// Directory with .jpg, .jpeg or .png files
    directory: PathBuf,

    /// Index of the first image to show
    #[arg(default_value_t = 0)]
    start: usize,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Main application state
struct PicTagger {
    /// Image list, current image and its tags
    session: Session,
    /// Where keywords are read from and written to
    store: Arc<dyn MetadataStore>,
    config: Config,
    /// Picture currently on screen
    preview: Option<Preview>,
    /// Text of the "new tag" entry
    entry: String,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// "<<" button
    Back,
    /// ">>" button or space bar
    Forward,
    EntryChanged(String),
    /// Enter in the tag entry: add a palette button
    EntrySubmitted,
    /// A palette button was clicked
    TagPressed(String),
    TagsLoaded(LoadTicket, Result<Vec<String>, String>),
    PreviewLoaded(PathBuf, Result<Preview, String>),
    WriteFinished(PathBuf, Result<(), String>),
}

impl PicTagger {
    /// Create the application and start loading the first image
    fn new(session: Session, store: Arc<dyn MetadataStore>, config: Config) -> (Self, Task<Message>) {
        let mut app = PicTagger {
            session,
            store,
            config,
            preview: None,
            entry: String::new(),
            status: String::from("Ready."),
        };

        let ticket = app.session.begin_load();
        let task = app.load(ticket);
        (app, task)
    }

    fn title(&self) -> String {
        let name = self
            .session
            .current_path()
            .file_name()
            .unwrap_or_default()
            .to_string_lossy();
        format!("Pic tag now! - {}", name)
    }

    /// Read tags and decode the preview of the ticket's image
    fn load(&mut self, ticket: LoadTicket) -> Task<Message> {
        let path = ticket.path.clone();
        if self.preview.as_ref().is_some_and(|p| p.path != path) {
            self.preview = None;
        }

        Task::batch([
            self.read_tags(ticket),
            Task::perform(
                preview::load_preview(path, self.config.preview_max_width, self.config.preview_max_height),
                |(path, result)| Message::PreviewLoaded(path, result),
            ),
        ])
    }

    fn read_tags(&self, ticket: LoadTicket) -> Task<Message> {
        Task::perform(
            read_keywords_async(Arc::clone(&self.store), ticket),
            |(ticket, result)| Message::TagsLoaded(ticket, result),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Back | Message::Forward => {
                if !self.session.can_navigate() {
                    self.status = "⏳ Still saving tags, try again in a moment.".to_string();
                    return Task::none();
                }

                let moved = if matches!(message, Message::Back) {
                    self.session.back()
                } else {
                    self.session.forward()
                };

                match moved {
                    Some(ticket) => {
                        tracing::info!("Showing {} ({}/{})", ticket.path.display(), self.session.index() + 1, self.session.len());
                        self.load(ticket)
                    }
                    // Already at the first/last image
                    None => Task::none(),
                }
            }
            Message::EntryChanged(value) => {
                self.entry = value;
                Task::none()
            }
            Message::EntrySubmitted => {
                let value = std::mem::take(&mut self.entry);
                if self.session.add_to_palette(&value) {
                    self.status = format!("Added tag button '{}'.", value.trim());
                } else if !value.trim().is_empty() {
                    self.status = format!("Tag '{}' already exists or is not valid.", value.trim());
                }
                Task::none()
            }
            Message::TagPressed(tag) => match self.session.toggle(&tag) {
                Some(request) => {
                    self.status = format!("Saving tags of {}...", file_name(&request.path));
                    Task::perform(
                        write_keywords_async(Arc::clone(&self.store), request),
                        |(path, result)| Message::WriteFinished(path, result),
                    )
                }
                None => Task::none(),
            },
            Message::TagsLoaded(ticket, result) => {
                let path = ticket.path;
                let error = result.as_ref().err().cloned();
                if self.session.tags_loaded(ticket.id, result) {
                    if let Some(err) = error {
                        tracing::error!("Reading tags of {} failed: {}", path.display(), err);
                        self.status = format!("⚠️  Could not read tags of {}: {}", file_name(&path), err);
                    }
                }
                Task::none()
            }
            Message::PreviewLoaded(path, result) => {
                if path == self.session.current_path() {
                    match result {
                        Ok(preview) => self.preview = Some(preview),
                        Err(err) => {
                            tracing::warn!("{}", err);
                            self.preview = None;
                            self.status = format!("⚠️  {}", err);
                        }
                    }
                }
                Task::none()
            }
            Message::WriteFinished(path, result) => {
                match &result {
                    Ok(()) => self.status = format!("✅ Saved tags of {}.", file_name(&path)),
                    Err(err) => {
                        tracing::error!("Writing tags of {} failed: {}", path.display(), err);
                        self.status = format!("⚠️  Failed to save tags of {}: {}", file_name(&path), err);
                    }
                }

                match self.session.write_finished(&path, &result) {
                    AfterWrite::Done => Task::none(),
                    AfterWrite::Reload(ticket) => self.read_tags(ticket),
                }
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let can_navigate = self.session.can_navigate();
        let can_toggle = self.session.can_toggle();

        let picture: Element<'_, Message> = match &self.preview {
            Some(preview) => image(preview.handle.clone()).into(),
            None => text("Loading image...").into(),
        };

        let picture = container(picture)
            .center_x(Length::Fixed(self.config.preview_max_width as f32))
            .center_y(Length::Fixed(self.config.preview_max_height as f32));

        let controls = row![
            button("<<").on_press_maybe(can_navigate.then_some(Message::Back)),
            button(">>").on_press_maybe(can_navigate.then_some(Message::Forward)),
            text(self.position_label()),
            text_input("New tag", &self.entry)
                .on_input(Message::EntryChanged)
                .on_submit(Message::EntrySubmitted)
                .width(Length::Fixed(200.0)),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let current: Element<'_, Message> = match self.session.tags() {
            TagState::Loading => text("Loading tags...").into(),
            TagState::Unavailable(err) => text(format!("Tags unavailable: {}", err)).into(),
            TagState::Ready(set) if set.is_empty() => text("No tags").into(),
            TagState::Ready(set) => {
                column(set.as_slice().iter().map(|tag| text(tag.as_str()).into()))
                    .spacing(4)
                    .into()
            }
        };

        let tag_list = column![text("Tags").size(18), scrollable(current).height(Length::Fill)]
            .spacing(8)
            .width(Length::Fixed(200.0));

        let buttons: Column<'_, Message> = column(self.session.palette().iter().map(|tag| {
            let active = matches!(self.session.tags(), TagState::Ready(set) if set.contains(tag));
            let style: fn(&Theme, button::Status) -> button::Style = if active {
                button::primary
            } else {
                button::secondary
            };

            button(text(tag))
                .style(style)
                .width(Length::Fill)
                .on_press_maybe(can_toggle.then(|| Message::TagPressed(tag.to_string())))
                .into()
        }))
        .spacing(4);

        let palette = column![text("Known tags").size(18), scrollable(buttons).height(Length::Fill)]
            .spacing(8)
            .width(Length::Fixed(220.0));

        let left = column![picture, controls, text(&self.status).size(16)].spacing(10);

        container(row![left, tag_list, palette].spacing(20))
            .padding(20)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// "2 / 10" plus the preview size once it is decoded
    fn position_label(&self) -> String {
        let position = format!("{} / {}", self.session.index() + 1, self.session.len());
        match &self.preview {
            Some(preview) => format!("{}  ({}x{})", position, preview.width, preview.height),
            None => position,
        }
    }

    /// Space bar moves forward (unless a text field has focus)
    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(|key, _modifiers| match key {
            keyboard::Key::Named(keyboard::key::Named::Space) => Some(Message::Forward),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

/// Read keywords in a blocking task so the UI stays responsive
async fn read_keywords_async(
    store: Arc<dyn MetadataStore>,
    ticket: LoadTicket,
) -> (LoadTicket, Result<Vec<String>, String>) {
    let path = ticket.path.clone();
    let result = task::spawn_blocking(move || store.read_keywords(&path).map_err(|e| e.to_string()))
        .await
        .map_err(|e| format!("Task join error: {}", e))
        .and_then(|r| r);
    (ticket, result)
}

/// Run a keyword write in a blocking task
async fn write_keywords_async(
    store: Arc<dyn MetadataStore>,
    request: WriteRequest,
) -> (PathBuf, Result<(), String>) {
    let key = request.path.clone();
    let result = task::spawn_blocking(move || {
        store
            .write_keywords(&request.path, &request.tags, &request.removals)
            .map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))
    .and_then(|r| r);
    (key, result)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    logging::init_logging();

    let config = Config::load_or_default(cli.config.as_deref());

    let files = match state::library::scan_directory(&cli.directory) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("🛑 {}", e);
            return ExitCode::from(1);
        }
    };

    let Some(session) = Session::new(files, cli.start) else {
        eprintln!("🛑 No images to show in '{}'", cli.directory.display());
        return ExitCode::from(1);
    };

    let store: Arc<dyn MetadataStore> = Arc::new(ExifTool::new(config.exiftool.clone()));

    let result = iced::application(PicTagger::title, PicTagger::update, PicTagger::view)
        .theme(PicTagger::theme)
        .subscription(PicTagger::subscription)
        .centered()
        .run_with(move || PicTagger::new(session, store, config));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("GUI error: {}", e);
            ExitCode::FAILURE
        }
    }
}
