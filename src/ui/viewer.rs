use std::path::PathBuf;
use std::time::Duration;

use iced::widget::{container, image as picture, text};
use iced::{
    keyboard, time, window, Background, Color, ContentFit, Element, Length, Subscription, Task,
    Theme,
};
use tracing::{info, warn};

use super::handoff::PresenterInbox;

/// How often the inbox is drained
const TICK: Duration = Duration::from_millis(100);
/// How long a new image stays above other windows
const TOPMOST_HOLD: Duration = Duration::from_secs(1);

/// Full-screen viewer state
pub struct Viewer {
    inbox: PresenterInbox,
    /// Decoded handle for the image on screen
    frame: Option<picture::Handle>,
    /// Path of the image on screen
    showing: Option<PathBuf>,
}

/// Viewer messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// Periodic inbox drain
    Tick,
    /// Background load of an artifact finished
    FrameLoaded(Result<(PathBuf, picture::Handle), String>),
    /// Escape pressed or window closed
    Hide,
    /// Drop the window back to the normal level
    ReleaseTopmost,
}

impl Viewer {
    fn new(inbox: PresenterInbox) -> (Self, Task<Message>) {
        (
            Viewer {
                inbox,
                frame: None,
                showing: None,
            },
            Task::none(),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => match self.inbox.drain_latest() {
                // Read off the UI thread so a large artifact doesn't stall a frame
                Some(request) => Task::perform(load_frame(request.path), Message::FrameLoaded),
                None => Task::none(),
            },
            Message::FrameLoaded(Ok((path, handle))) => {
                info!(path = %path.display(), "showing image");
                self.frame = Some(handle);
                self.showing = Some(path);
                reveal()
            }
            Message::FrameLoaded(Err(err)) => {
                warn!(error = %err, showing = ?self.showing, "failed to display image");
                Task::none()
            }
            Message::Hide => {
                info!("viewer hidden, still watching");
                window::get_oldest().and_then(|id| {
                    window::change_mode(id, window::Mode::Windowed)
                        .chain(window::change_mode(id, window::Mode::Hidden))
                })
            }
            Message::ReleaseTopmost => window::get_oldest()
                .and_then(|id| window::change_level(id, window::Level::Normal)),
        }
    }

    fn view(&self) -> Element<Message> {
        let content: Element<Message> = match &self.frame {
            Some(handle) => picture(handle.clone())
                .content_fit(ContentFit::ScaleDown)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => text("Waiting for new images...")
                .size(24)
                .color(Color::from_rgb(0.6, 0.6, 0.6))
                .into(),
        };

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(Background::Color(Color::BLACK)),
                ..container::Style::default()
            })
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            time::every(TICK).map(|_| Message::Tick),
            keyboard::on_key_press(|key, _modifiers| match key {
                keyboard::Key::Named(keyboard::key::Named::Escape) => Some(Message::Hide),
                _ => None,
            }),
            window::close_requests().map(|_| Message::Hide),
        ])
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Run the viewer on the calling thread until the application exits
///
/// The window starts hidden and appears full-screen with the first image.
pub fn run(inbox: PresenterInbox) -> iced::Result {
    iced::application("Sync Image Viewer", Viewer::update, Viewer::view)
        .subscription(Viewer::subscription)
        .theme(Viewer::theme)
        .window(window::Settings {
            visible: false,
            exit_on_close_request: false,
            ..window::Settings::default()
        })
        .run_with(move || Viewer::new(inbox))
}

/// Full-screen, raise, focus, then release always-on-top after a moment
fn reveal() -> Task<Message> {
    let raise = window::get_oldest().and_then(|id| {
        window::change_mode(id, window::Mode::Fullscreen)
            .chain(window::change_level(id, window::Level::AlwaysOnTop))
            .chain(window::gain_focus(id))
    });
    let release = Task::perform(
        async { tokio::time::sleep(TOPMOST_HOLD).await },
        |()| Message::ReleaseTopmost,
    );

    Task::batch([raise, release])
}

async fn load_frame(path: PathBuf) -> Result<(PathBuf, picture::Handle), String> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    // Fresh handle per load: a rewritten file with the same name must not hit a stale cache
    Ok((path, picture::Handle::from_bytes(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::handoff;

    #[test]
    fn idle_tick_keeps_current_frame() {
        let (_handle, inbox) = handoff::channel();
        let (mut viewer, _) = Viewer::new(inbox);

        let _ = viewer.update(Message::Tick);

        assert!(viewer.frame.is_none());
        assert!(viewer.showing.is_none());
    }

    #[test]
    fn loaded_frame_replaces_the_current_one() {
        let (_handle, inbox) = handoff::channel();
        let (mut viewer, _) = Viewer::new(inbox);

        let first = picture::Handle::from_bytes(b"first".to_vec());
        let second = picture::Handle::from_bytes(b"second".to_vec());
        let _ = viewer.update(Message::FrameLoaded(Ok((PathBuf::from("out/a.jpg"), first))));
        let _ = viewer.update(Message::FrameLoaded(Ok((PathBuf::from("out/b.jpg"), second))));

        assert_eq!(viewer.showing, Some(PathBuf::from("out/b.jpg")));
    }

    #[test]
    fn failed_load_keeps_what_is_showing() {
        let (_handle, inbox) = handoff::channel();
        let (mut viewer, _) = Viewer::new(inbox);
        let handle = picture::Handle::from_bytes(b"shown".to_vec());
        let _ = viewer.update(Message::FrameLoaded(Ok((PathBuf::from("out/a.jpg"), handle))));

        let _ = viewer.update(Message::FrameLoaded(Err("gone".to_string())));

        assert_eq!(viewer.showing, Some(PathBuf::from("out/a.jpg")));
        assert!(viewer.frame.is_some());
    }
}
