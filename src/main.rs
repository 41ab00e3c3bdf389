use iced::widget::image::Handle;
use iced::widget::{button, checkbox, column, container, row, scrollable, slider, text, Column};
use iced::{event, keyboard, mouse, window, Alignment, Color, Element, Event, Length, Size};
use iced::{Subscription, Task, Theme};
use rfd::FileDialog;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod ingest;
mod preview;
mod state;
mod ui;

use config::ShelfPaths;
use ingest::clipboard::{self, PastedImage};
use ingest::fetch::{self, FetchOutcome};
use preview::thumbnail::{self, Thumbnail};
use state::command::{Command, SettingsChange, Source};
use ui::row::PressTracker;
use state::data::{ContentKind, MAX_OPACITY, MIN_OPACITY};
use state::guard::DragScope;
use state::shelf::{Activity, Shelf};

/// How long "Added to CSV" stays on the status line
const CSV_STATUS_MS: u64 = 1500;
/// How long "Downloaded!" stays on the status line
const DOWNLOAD_STATUS_MS: u64 = 2000;

/// Main application state
struct DropShelf {
    /// Items, settings and every mutation on them
    shelf: Shelf,
    /// Shared by all downloads
    http: reqwest::Client,
    /// Image previews; None while loading or when the file can't be decoded
    thumbnails: HashMap<PathBuf, Option<Handle>>,
    /// Row last pressed, target of Delete/Backspace and Ctrl+P
    selected: Option<PathBuf>,
    /// Recognises a double press on a row
    presses: PressTracker,
    /// Ctrl held: drag only the grabbed item
    single_mode: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// A file was dropped onto the window
    FileDropped(PathBuf),
    KeyPressed(keyboard::Key, keyboard::Modifiers),
    ModifiersChanged(keyboard::Modifiers),
    /// Clipboard text arrived after Ctrl+V
    Pasted(Option<String>),
    /// Clipboard image arrived after Ctrl+V
    ImagePasted(Option<PastedImage>),
    /// Open the selected item with the default application
    OpenSelected,
    /// User clicked "Add Files"
    PickFiles,
    Remove(PathBuf),
    TogglePin(PathBuf),
    ClearAll,
    ClearCache,
    ToggleLock,
    DownloadImagesToggled(bool),
    CsvModeToggled(bool),
    OpacityChanged(f32),
    /// Pointer pressed on a row: a drag-out gesture begins
    DragStarted(PathBuf),
    /// Left button released inside the window
    PointerReleased,
    /// Pointer left the window
    CursorLeft,
    /// Background download completed (or failed)
    FetchFinished(FetchOutcome),
    ThumbnailReady(PathBuf, Option<Thumbnail>),
    StatusExpired,
    CloseRequested,
}

impl DropShelf {
    /// Create a new instance of the application
    fn new(paths: ShelfPaths) -> (Self, Task<Message>) {
        let shelf = Shelf::open(&paths);
        info!(
            "🎨 DropShelf initialized with {} items from {}",
            shelf.items().len(),
            shelf.cache_dir().display()
        );

        let mut app = DropShelf {
            shelf,
            http: fetch::http_client(),
            thumbnails: HashMap::new(),
            selected: None,
            presses: PressTracker::default(),
            single_mode: false,
        };
        let thumbnails = app.sync_thumbnails();

        (app, thumbnails)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let task = match message {
            Message::FileDropped(path) => self.run(Command::DropFiles(vec![path])),
            Message::Pasted(Some(payload)) => self.run(Command::Ingest {
                payload,
                source: Source::Paste,
            }),
            Message::Pasted(None) => Task::none(),
            Message::ImagePasted(Some(image)) => self.run(Command::PasteImage(image)),
            Message::ImagePasted(None) => Task::none(),
            Message::OpenSelected => {
                if let Some(path) = &self.selected {
                    open_with_default_app(path);
                }
                Task::none()
            }
            Message::KeyPressed(key, modifiers) => self.on_key(key, modifiers),
            Message::ModifiersChanged(modifiers) => {
                self.single_mode = modifiers.control();
                Task::none()
            }
            Message::PickFiles => {
                // Show the native file picker dialog
                let files = FileDialog::new()
                    .set_title("Add Files to the Shelf")
                    .pick_files();

                match files {
                    Some(paths) => self.run(Command::AddPaths(paths)),
                    None => Task::none(),
                }
            }
            Message::Remove(path) => self.run(Command::Remove(path)),
            Message::TogglePin(path) => self.run(Command::TogglePin(path)),
            Message::ClearAll => self.run(Command::ClearAll),
            Message::ClearCache => self.run(Command::ClearCache),
            Message::ToggleLock => {
                self.shelf.toggle_lock();
                Task::none()
            }
            Message::DownloadImagesToggled(on) => {
                self.run(Command::UpdateSettings(SettingsChange::DownloadImages(on)))
            }
            Message::CsvModeToggled(on) => {
                self.run(Command::UpdateSettings(SettingsChange::CsvMode(on)))
            }
            Message::OpacityChanged(opacity) => {
                self.run(Command::UpdateSettings(SettingsChange::Opacity(opacity)))
            }
            Message::DragStarted(path) => {
                self.selected = Some(path.clone());
                if self.presses.press(&path, Instant::now()) {
                    open_with_default_app(&path);
                }
                let scope = if self.single_mode {
                    DragScope::Single(path)
                } else {
                    DragScope::All
                };
                self.shelf.begin_drag(scope);
                Task::none()
            }
            Message::PointerReleased => {
                if self.shelf.is_dragging() {
                    // Released over our own window: the gesture came back
                    self.shelf.observe_drop();
                    self.shelf.end_drag();
                }
                Task::none()
            }
            // The toolkit has no native drag source; the uri-list goes to
            // the clipboard for the receiving application
            Message::CursorLeft => match self.shelf.drag_out() {
                Some(payload) => iced::clipboard::write(payload),
                None => Task::none(),
            },
            Message::FetchFinished(outcome) => {
                if self.shelf.complete_fetch(outcome) {
                    expire_status_after(DOWNLOAD_STATUS_MS)
                } else {
                    Task::none()
                }
            }
            Message::ThumbnailReady(path, thumb) => {
                if let Some(slot) = self.thumbnails.get_mut(&path) {
                    *slot = thumb.map(|t| Handle::from_rgba(t.width, t.height, t.pixels));
                }
                Task::none()
            }
            Message::StatusExpired => {
                self.shelf.settle_activity();
                Task::none()
            }
            Message::CloseRequested => {
                self.shelf.shutdown();
                iced::exit()
            }
        };

        Task::batch([task, self.sync_thumbnails()])
    }

    /// Execute a shelf command and start whatever background work it produced
    fn run(&mut self, command: Command) -> Task<Message> {
        let outcome = self.shelf.execute(command);
        if !outcome.accepts_drop() {
            debug!("Command rejected: shelf is locked");
            return Task::none();
        }
        if outcome.changed() {
            debug!(
                "Shelf holds {} items, {} downloads pending",
                self.shelf.items().len(),
                self.shelf.pending_fetches()
            );
        }

        let mut tasks: Vec<Task<Message>> = outcome
            .into_fetches()
            .into_iter()
            .map(|job| Task::perform(fetch::download(self.http.clone(), job), Message::FetchFinished))
            .collect();

        if self.shelf.activity() == Activity::AddedToCsv {
            tasks.push(expire_status_after(CSV_STATUS_MS));
        }

        Task::batch(tasks)
    }

    fn on_key(&mut self, key: keyboard::Key, modifiers: keyboard::Modifiers) -> Task<Message> {
        use keyboard::key::Named;
        use keyboard::Key;

        match key.as_ref() {
            Key::Character("q") if modifiers.command() => {
                self.shelf.shutdown();
                iced::exit()
            }
            Key::Character("d") if modifiers.command() => {
                self.shelf.toggle_lock();
                Task::none()
            }
            Key::Character("v") if modifiers.command() => Task::batch([
                iced::clipboard::read().map(Message::Pasted),
                Task::perform(clipboard::read_image(), Message::ImagePasted),
            ]),
            Key::Character("p") if modifiers.command() => Task::done(Message::OpenSelected),
            Key::Named(Named::Delete) if modifiers.shift() => self.run(Command::ClearAll),
            Key::Named(Named::Delete | Named::Backspace) => match self.selected.clone() {
                Some(path) => self.run(Command::Remove(path)),
                None => Task::none(),
            },
            _ => Task::none(),
        }
    }

    /// Drop previews of items that left the shelf and start loading
    /// previews for new image items
    fn sync_thumbnails(&mut self) -> Task<Message> {
        let items = self.shelf.items();
        self.thumbnails
            .retain(|path, _| items.iter().any(|item| &item.path == path));

        let wanted: Vec<PathBuf> = items
            .iter()
            .filter(|item| item.kind == ContentKind::Image)
            .filter(|item| !self.thumbnails.contains_key(&item.path))
            .map(|item| item.path.clone())
            .collect();

        let mut tasks = Vec::with_capacity(wanted.len());
        for path in wanted {
            self.thumbnails.insert(path.clone(), None);
            tasks.push(Task::perform(
                thumbnail::load_thumbnail(path.clone()),
                move |thumb| Message::ThumbnailReady(path.clone(), thumb),
            ));
        }
        Task::batch(tasks)
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let locked = self.shelf.is_locked();
        let settings = self.shelf.settings();

        let toolbar = row![
            button("Add Files").on_press(Message::PickFiles),
            button(if locked { "Unlock" } else { "Lock" }).on_press(Message::ToggleLock),
            button("Clear All").on_press_maybe((!locked).then_some(Message::ClearAll)),
            button("Clear Cache")
                .on_press_maybe((!locked).then_some(Message::ClearCache))
                .style(button::danger),
        ]
        .spacing(8);

        let behavior = row![
            checkbox("Download images from URLs", settings.download_images)
                .on_toggle(Message::DownloadImagesToggled),
            checkbox("Collect text as CSV", settings.csv_mode).on_toggle(Message::CsvModeToggled),
            text("Opacity"),
            slider(MIN_OPACITY..=MAX_OPACITY, settings.opacity, Message::OpacityChanged)
                .step(0.05)
                .width(Length::Fixed(120.0)),
        ]
        .spacing(16)
        .align_y(Alignment::Center);

        let list: Element<Message> = if self.shelf.is_empty() {
            container(text("Drop files, links, images or text here").size(16))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into()
        } else {
            let rows = Column::with_children(self.shelf.items().iter().map(|item| {
                let thumbnail = self.thumbnails.get(&item.path).and_then(Option::as_ref);
                let selected = self.selected.as_ref() == Some(&item.path);
                ui::row::item_row(item, thumbnail, selected)
            }));
            scrollable(rows).height(Length::Fill).into()
        };

        let status = text(ui::status::status_text(
            locked,
            self.single_mode,
            self.shelf.activity(),
        ))
        .size(14);

        let content = column![toolbar, behavior, list, status]
            .spacing(12)
            .padding(16)
            .align_x(Alignment::Start);

        let opacity = settings.opacity;
        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(move |theme: &Theme| {
                let base = theme.extended_palette().background.base;
                container::Style {
                    background: Some(Color { a: opacity, ..base.color }.into()),
                    text_color: Some(base.text),
                    ..container::Style::default()
                }
            })
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, status, _window| match event {
            Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            Event::Window(window::Event::CloseRequested) => Some(Message::CloseRequested),
            Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. })
                if status == event::Status::Ignored =>
            {
                Some(Message::KeyPressed(key, modifiers))
            }
            Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
                Some(Message::ModifiersChanged(modifiers))
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                Some(Message::PointerReleased)
            }
            Event::Mouse(mouse::Event::CursorLeft) => Some(Message::CursorLeft),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Hand a shelf item to the desktop's default application
fn open_with_default_app(path: &Path) {
    match open::that_detached(path) {
        Ok(()) => info!("👁️  Opened {}", path.display()),
        Err(e) => warn!("Failed to open {}: {}", path.display(), e),
    }
}

/// Reset the status line after a transient message has been shown
fn expire_status_after(millis: u64) -> Task<Message> {
    Task::perform(tokio::time::sleep(Duration::from_millis(millis)), |_| {
        Message::StatusExpired
    })
}

fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drop_shelf=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let paths = match ShelfPaths::resolve() {
        Ok(paths) => paths,
        Err(e) => {
            error!("Cannot prepare shelf directories: {}", e);
            std::process::exit(1);
        }
    };
    info!("📄 State file: {}", paths.state_file.display());

    iced::application("DropShelf", DropShelf::update, DropShelf::view)
        .subscription(DropShelf::subscription)
        .theme(DropShelf::theme)
        .window(window::Settings {
            size: Size::new(500.0, 400.0),
            transparent: true,
            exit_on_close_request: false,
            ..window::Settings::default()
        })
        .run_with(move || DropShelf::new(paths))
}
