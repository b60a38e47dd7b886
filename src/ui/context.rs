use chrono::{Datelike, Duration, NaiveDate};

use unsegen::base::style::*;
use unsegen::widget::builtin::PromptLine;

use crate::calendar::MonthIndex;
use crate::color;
use crate::error::Error;
use crate::picker::{DatePicker, Navigation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Edit,
}

pub(crate) fn term_color(color: color::Color) -> Color {
    Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

#[derive(Clone, Debug)]
pub struct Theme {
    pub panel_style: StyleModifier,
    pub weekend_style: StyleModifier,
    pub header_style: StyleModifier,
    pub week_style: StyleModifier,
    pub focus_day_style: StyleModifier,
    pub selected_day_style: StyleModifier,
    pub today_day_char: char,
    pub field_style: StyleModifier,
    pub error_style: StyleModifier,
}

impl Theme {
    /// Styles derived from the picker's text and weekend colors.
    pub fn for_picker(picker: &DatePicker) -> Self {
        let panel_style = StyleModifier::new()
            .fg_color(term_color(picker.text_color()))
            .bg_color(Color::White);

        Theme {
            panel_style,
            weekend_style: panel_style.fg_color(term_color(picker.weekend_color())),
            header_style: panel_style.format(TextFormatModifier::default().bold(true)),
            week_style: panel_style.fg_color(Color::Blue),
            focus_day_style: panel_style.invert(true),
            selected_day_style: panel_style.bg_color(Color::Cyan),
            today_day_char: '*',
            field_style: StyleModifier::new().format(TextFormatModifier::default().underline(true)),
            error_style: StyleModifier::new().fg_color(Color::Red),
        }
    }
}

pub struct Context {
    picker: DatePicker,
    pub mode: Mode,
    popup_open: bool,
    focus: NaiveDate,
    text_input: PromptLine,
    status: Option<String>,
}

impl Context {
    pub fn new(picker: DatePicker) -> Self {
        let mut context = Context {
            focus: picker.cursor().first_day(),
            picker,
            mode: Mode::Normal,
            popup_open: false,
            text_input: PromptLine::with_prompt("> ".to_owned()),
            status: None,
        };
        context.reset_focus();
        context
    }

    pub fn picker(&self) -> &DatePicker {
        &self.picker
    }

    pub fn into_picker(self) -> DatePicker {
        self.picker
    }

    /// Day the keyboard cursor rests on, always inside the displayed month.
    pub fn focus(&self) -> NaiveDate {
        self.focus
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_popup_open(&self) -> bool {
        self.popup_open
    }

    pub fn toggle_popup(&mut self) {
        self.popup_open = !self.popup_open;
        if self.popup_open {
            self.picker.show_selected();
            self.reset_focus();
        }
    }

    pub fn text_input(&self) -> &PromptLine {
        &self.text_input
    }

    pub fn text_input_mut(&mut self) -> &mut PromptLine {
        &mut self.text_input
    }

    /// Puts the focus on the selection, today or the first of the displayed month.
    fn reset_focus(&mut self) {
        let cursor = self.picker.cursor();
        let selected = self.picker.selected_date().map(|s| s.date_naive());

        self.focus = selected
            .into_iter()
            .chain(std::iter::once(self.picker.today()))
            .find(|date| cursor.contains(date))
            .unwrap_or_else(|| cursor.first_day());
    }

    fn clamp_focus(&mut self) {
        let cursor = self.picker.cursor();
        let day = self.focus.day().min(cursor.num_days());
        self.focus = cursor.date(day).unwrap_or_else(|| cursor.first_day());
    }

    pub fn move_focus(&mut self, days: i64) {
        if let Some(focus) = self.focus.checked_add_signed(Duration::days(days)) {
            self.focus = focus;
            if !self.picker.cursor().contains(&focus) {
                self.picker.show_month(MonthIndex::from(focus));
            }
        }
    }

    pub fn navigate(&mut self, navigation: Navigation) {
        self.picker.navigate(navigation);
        self.clamp_focus();
    }

    pub fn show_today(&mut self) {
        self.picker.show_today();
        self.focus = self.picker.today();
    }

    pub fn select_focus(&mut self) {
        match self.picker.select_day(self.focus.day()) {
            Ok(_) => {
                self.status = None;
                if self.picker.auto_close() {
                    self.popup_open = false;
                }
            }
            Err(e) => self.report(e),
        }
    }

    pub fn adjust_time(&mut self, minutes: i64) {
        match self.picker.adjust_time(minutes) {
            Ok(_) => self.status = None,
            Err(e) => self.report(e),
        }
    }

    pub fn toggle_week_numbers(&mut self) {
        let visible = self.picker.week_numbers_visible();
        self.picker.set_week_numbers_visible(!visible);
    }

    pub fn begin_edit(&mut self) {
        let text = self.picker.text();
        self.text_input.set(&text);
        self.mode = Mode::Edit;
    }

    pub fn abort_edit(&mut self) {
        self.text_input.set("");
        self.status = None;
        self.mode = Mode::Normal;
    }

    /// Applies the edited line. On error the line stays open for correction.
    pub fn commit_edit(&mut self) {
        let line = self.text_input.finish_line().to_owned();

        match self.picker.commit_text(&line) {
            Ok(_) => {
                self.status = None;
                self.mode = Mode::Normal;
                self.reset_focus();
            }
            Err(e) => {
                self.text_input.set(&line);
                self.report(e);
            }
        }
    }

    pub fn report(&mut self, error: Error) {
        self.status = Some(error.to_string());
    }

    pub fn update(&mut self) {
        if self.picker.tick() {
            log::debug!("Date changed to {}", self.picker.today());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;
    use crate::picker::PickerOptions;
    use crate::zone::Zone;
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;

    fn context() -> Context {
        let zone = Zone::from_str("Europe/Berlin").unwrap();
        let options = PickerOptions {
            locale: Locale::from_str("de_DE").unwrap(),
            zone: zone.clone(),
            ..PickerOptions::default()
        };
        let selected = zone.with_ymd_and_hms(2024, 1, 31, 8, 0, 0).unwrap();
        let mut picker = DatePicker::with_selection(options, selected);
        picker.set_now(Utc.with_ymd_and_hms(2024, 2, 20, 11, 0, 0).unwrap());
        Context::new(picker)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn focus_starts_on_selection() {
        let context = context();
        assert_eq!(context.focus(), date(2024, 1, 31));
    }

    #[test]
    fn focus_crosses_month_boundaries() {
        let mut context = context();
        context.move_focus(1);
        assert_eq!(context.focus(), date(2024, 2, 1));
        assert_eq!(context.picker().cursor(), MonthIndex::from(date(2024, 2, 1)));

        context.move_focus(-7);
        assert_eq!(context.picker().cursor(), MonthIndex::from(date(2024, 1, 1)));
    }

    #[test]
    fn navigation_clamps_focus() {
        let mut context = context();
        context.navigate(Navigation::NextMonth);
        assert_eq!(context.focus(), date(2024, 2, 29));
        context.navigate(Navigation::NextYear);
        assert_eq!(context.focus(), date(2025, 2, 28));
    }

    #[test]
    fn selecting_closes_popup() {
        let mut context = context();
        context.toggle_popup();
        assert!(context.is_popup_open());

        context.move_focus(-1);
        context.select_focus();

        assert!(!context.is_popup_open());
        assert_eq!(
            context.picker().selected_date().map(|s| s.date_naive()),
            Some(date(2024, 1, 30))
        );
    }

    #[test]
    fn failed_commit_reports_error() {
        let mut context = context();
        context.begin_edit();
        assert_eq!(context.mode, Mode::Edit);

        context.text_input_mut().set("not a date");
        context.commit_edit();

        assert_eq!(context.mode, Mode::Edit);
        assert!(context.status().is_some());

        context.text_input_mut().set("14.02.2024 10:00");
        context.commit_edit();

        assert_eq!(context.mode, Mode::Normal);
        assert!(context.status().is_none());
        assert_eq!(context.focus(), date(2024, 2, 14));
    }
}
