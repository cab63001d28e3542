use std::time::{Duration, Instant};

use unsegen::base::*;
use unsegen::widget::*;

use super::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

/// A short message shown in the bottom bar until it expires.
#[derive(Clone, Debug)]
pub struct Toast {
    message: String,
    kind: ToastKind,
    expires_at: Instant,
}

impl Toast {
    pub fn new(message: String, kind: ToastKind, duration: Duration) -> Self {
        Toast {
            message,
            kind,
            expires_at: Instant::now() + duration,
        }
    }

    pub fn info(message: String, duration: Duration) -> Self {
        Toast::new(message, ToastKind::Info, duration)
    }

    pub fn error(message: String, duration: Duration) -> Self {
        Toast::new(message, ToastKind::Error, duration)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> ToastKind {
        self.kind
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn as_widget<'a>(&'a self, theme: &'a Theme) -> ToastLine<'a> {
        ToastLine { toast: self, theme }
    }
}

pub struct ToastLine<'a> {
    toast: &'a Toast,
    theme: &'a Theme,
}

impl Widget for ToastLine<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(self.toast.message.chars().count() + 2),
            height: RowDemand::exact(1),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let style = match self.toast.kind {
            ToastKind::Info => self.theme.toast_style,
            ToastKind::Error => self.theme.error_toast_style,
        };

        let mut cursor = Cursor::new(&mut window);
        cursor.set_style_modifier(style);
        cursor.write(&format!(" {} ", self.toast.message));
    }
}
