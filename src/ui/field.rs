use unsegen::base::*;
use unsegen::widget::*;

use super::{Context, Mode, Theme};

/// Text field of the picker with the popup indicator on its right.
pub struct TextField<'a> {
    context: &'a Context,
    theme: &'a Theme,
}

impl<'a> TextField<'a> {
    const MIN_WIDTH: usize = 16;
    const INDICATOR_OPEN: &'static str = " ▾";
    const INDICATOR_CLOSED: &'static str = " ◂";

    pub fn new(context: &'a Context, theme: &'a Theme) -> Self {
        TextField { context, theme }
    }
}

impl Widget for TextField<'_> {
    fn space_demand(&self) -> Demand2D {
        let text_width = self.context.picker().text().chars().count();
        Demand2D {
            width: ColDemand::at_least(text_width.max(Self::MIN_WIDTH) + 2),
            height: RowDemand::exact(1),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let text = self.context.picker().text();
        let indicator = if self.context.is_popup_open() {
            Self::INDICATOR_OPEN
        } else {
            Self::INDICATOR_CLOSED
        };

        let mut cursor = Cursor::new(&mut window).style_modifier(self.theme.field_style);
        cursor.write(&format!("{:<width$}", text, width = Self::MIN_WIDTH));
        cursor.set_style_modifier(StyleModifier::new());
        cursor.write(indicator);
    }
}

/// Last error, or a key summary for the current mode.
pub struct StatusLine<'a> {
    context: &'a Context,
    theme: &'a Theme,
}

impl<'a> StatusLine<'a> {
    pub fn new(context: &'a Context, theme: &'a Theme) -> Self {
        StatusLine { context, theme }
    }

    fn hint(&self) -> &'static str {
        match (self.context.mode, self.context.is_popup_open()) {
            (Mode::Edit, _) => "enter: apply  esc: cancel",
            (Mode::Normal, true) => {
                "hjkl: move  enter: select  p/n P/N: month/year  +/-: time  t: today  w: weeks"
            }
            (Mode::Normal, false) => "space: calendar  i: edit  +/-: time  q: quit",
        }
    }
}

impl Widget for StatusLine<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(1),
            height: RowDemand::exact(1),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let mut cursor = Cursor::new(&mut window);
        match self.context.status() {
            Some(message) => {
                cursor.set_style_modifier(self.theme.error_style);
                cursor.write(message);
            }
            None => cursor.write(self.hint()),
        }
    }
}
