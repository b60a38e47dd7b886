use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use std::rc::Rc;

use crate::calendar::{CalendarGrid, MonthIndex, WeekLayout};
use crate::color::Color;
use crate::error::{Error, ErrorKind, Result};
use crate::format::{self, DisplayMode, ParsedInput, TextFormat};
use crate::locale::Locale;
use crate::observer::{DatePickerEvent, DatePickerEventKind, DatePickerObserver, ObserverRegistry};
use crate::zone::Zone;

#[derive(Clone, Debug, PartialEq)]
pub struct PickerOptions {
    pub locale: Locale,
    pub week_numbers: bool,
    pub today_visible: bool,
    pub zone: Zone,
    pub display_mode: DisplayMode,
    pub text_color: Color,
    pub weekend_color: Color,
    /// `None` uses the locale's date pattern
    pub date_format: Option<String>,
    pub time_format: String,
    pub auto_close: bool,
}

impl Default for PickerOptions {
    fn default() -> Self {
        PickerOptions {
            locale: Locale::system(),
            week_numbers: false,
            today_visible: true,
            zone: Zone::Local,
            display_mode: DisplayMode::DateAndTime,
            text_color: Color::BLACK,
            weekend_color: Color::RED,
            date_format: None,
            time_format: format::DEFAULT_TIME_FORMAT.to_owned(),
            auto_close: true,
        }
    }
}

impl PickerOptions {
    fn text_format(&self) -> TextFormat {
        let mut text_format = TextFormat::for_locale(&self.locale);
        if let Some(date_format) = &self.date_format {
            text_format.date_format = date_format.clone();
        }
        text_format.time_format = self.time_format.clone();
        text_format
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    PreviousYear,
    PreviousMonth,
    NextMonth,
    NextYear,
}

/// View-model of a date picker.
///
/// The displayed month (cursor) and the selected date are independent: moving
/// through months never touches the selection, and selecting a day never moves
/// the cursor.
pub struct DatePicker {
    options: PickerOptions,
    text_format: TextFormat,
    cursor: MonthIndex,
    selection: Option<DateTime<Zone>>,
    time_of_day: NaiveTime,
    now: DateTime<Utc>,
    observers: ObserverRegistry,
}

impl DatePicker {
    /// A picker without selection, showing the current month.
    pub fn new(options: PickerOptions) -> Self {
        let now = Utc::now();
        let cursor = MonthIndex::from(now.with_timezone(&options.zone).date_naive());

        DatePicker {
            text_format: options.text_format(),
            options,
            cursor,
            selection: None,
            time_of_day: NaiveTime::MIN,
            now,
            observers: ObserverRegistry::new(),
        }
    }

    /// A picker showing the month of `selected`. The picker adopts the zone of `selected`.
    pub fn with_selection(mut options: PickerOptions, selected: DateTime<Zone>) -> Self {
        options.zone = selected.timezone();
        let mut picker = DatePicker::new(options);
        picker.cursor = MonthIndex::from(selected.date_naive());
        picker.time_of_day = selected.time();
        picker.selection = Some(selected);
        picker
    }

    pub fn options(&self) -> &PickerOptions {
        &self.options
    }

    pub fn locale(&self) -> &Locale {
        &self.options.locale
    }

    pub fn zone(&self) -> &Zone {
        &self.options.zone
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.options.display_mode
    }

    pub fn week_numbers_visible(&self) -> bool {
        self.options.week_numbers
    }

    pub fn today_visible(&self) -> bool {
        self.options.today_visible
    }

    pub fn text_color(&self) -> Color {
        self.options.text_color
    }

    pub fn weekend_color(&self) -> Color {
        self.options.weekend_color
    }

    pub fn auto_close(&self) -> bool {
        self.options.auto_close
    }

    pub fn text_format(&self) -> &TextFormat {
        &self.text_format
    }

    pub fn cursor(&self) -> MonthIndex {
        self.cursor
    }

    pub fn selected_date(&self) -> Option<&DateTime<Zone>> {
        self.selection.as_ref()
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.time_of_day
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn today(&self) -> NaiveDate {
        self.now.with_timezone(&self.options.zone).date_naive()
    }

    // ---- observers ----

    pub fn subscribe(&mut self, observer: Rc<dyn DatePickerObserver>) -> bool {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, observer: &Rc<dyn DatePickerObserver>) -> bool {
        self.observers.unsubscribe(observer)
    }

    fn fire(&self, kind: DatePickerEventKind, date: DateTime<Zone>) -> DatePickerEvent {
        let event = DatePickerEvent::new(kind, date);
        log::debug!("{:?}: {}", event.kind(), event.date());
        self.observers.notify(&event);
        event
    }

    // ---- navigation ----

    pub fn navigate(&mut self, navigation: Navigation) {
        match navigation {
            Navigation::PreviousYear => self.navigate_years(-1),
            Navigation::PreviousMonth => self.navigate_months(-1),
            Navigation::NextMonth => self.navigate_months(1),
            Navigation::NextYear => self.navigate_years(1),
        }
    }

    pub fn navigate_months(&mut self, delta: i32) {
        self.show_month(self.cursor + delta);
    }

    pub fn navigate_years(&mut self, delta: i32) {
        self.show_month(self.cursor.add_years(delta));
    }

    pub fn show_month(&mut self, month: MonthIndex) {
        log::debug!("Showing {}", month);
        self.cursor = month;
    }

    pub fn show_today(&mut self) {
        self.show_month(MonthIndex::from(self.today()));
    }

    pub fn show_selected(&mut self) {
        if let Some(selected) = &self.selection {
            self.show_month(MonthIndex::from(selected.date_naive()));
        }
    }

    /// Refreshes the current time. Returns `true` if the date of today changed.
    pub fn tick(&mut self) -> bool {
        self.set_now(Utc::now())
    }

    pub fn set_now(&mut self, now: DateTime<Utc>) -> bool {
        let before = self.today();
        self.now = now;
        before != self.today()
    }

    // ---- selection ----

    /// Selects `day` of the displayed month, keeping the time of day.
    pub fn select_day(&mut self, day: u32) -> Result<DatePickerEvent> {
        let date = self.cursor.date(day).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidDay,
                &format!("{} has no day {}", self.cursor, day),
            )
        })?;

        let selected = self.options.zone.resolve_local(&date.and_time(self.time_of_day))?;
        self.time_of_day = selected.time();
        self.selection = Some(selected.clone());

        Ok(self.fire(DatePickerEventKind::DateSelected, selected))
    }

    /// Changes the time of day of the selection, keeping its date.
    pub fn set_time(&mut self, time: NaiveTime) -> Result<DatePickerEvent> {
        let date = self
            .selection
            .as_ref()
            .map(|selected| selected.date_naive())
            .ok_or_else(|| Error::from(ErrorKind::NoSelection))?;

        let selected = self.options.zone.resolve_local(&date.and_time(time))?;
        self.time_of_day = selected.time();
        self.selection = Some(selected.clone());

        Ok(self.fire(DatePickerEventKind::TimeChanged, selected))
    }

    /// Moves the time of day by `minutes`, clamped to the selected day.
    pub fn adjust_time(&mut self, minutes: i64) -> Result<DatePickerEvent> {
        const LAST_SECOND: i64 = 24 * 60 * 60 - 1;

        let current = self.time_of_day.num_seconds_from_midnight() as i64;
        let seconds = current
            .saturating_add(minutes.saturating_mul(60))
            .clamp(0, LAST_SECOND) as u32;
        let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
            .ok_or_else(|| Error::from(ErrorKind::TimeParse))?;

        self.set_time(time)
    }

    /// Replaces the selection without notifying observers.
    pub fn set_selected_date(&mut self, selected: DateTime<Zone>) {
        let selected = selected.with_timezone(&self.options.zone);
        self.time_of_day = selected.time();
        self.selection = Some(selected);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Applies text typed into the picker's field.
    ///
    /// Parts missing from the text keep their current value. On success the
    /// cursor moves to the selected month and observers are notified; on
    /// failure the selection is left untouched and the error is returned.
    pub fn commit_text(&mut self, text: &str) -> Result<DatePickerEvent> {
        let parsed = format::parse_input(
            text,
            &self.options.locale,
            &self.text_format,
            self.options.display_mode,
        )
        .map_err(|e| {
            log::warn!("Rejected input: {}", e);
            e
        })?;

        let (kind, selected) = match parsed {
            ParsedInput::Timestamp(timestamp) => (
                DatePickerEventKind::DateSelected,
                timestamp.with_timezone(&self.options.zone),
            ),
            ParsedInput::Local { date, time } => {
                let kind = if date.is_some() {
                    DatePickerEventKind::DateSelected
                } else {
                    DatePickerEventKind::TimeChanged
                };
                let date = date
                    .or_else(|| self.selection.as_ref().map(|s| s.date_naive()))
                    .unwrap_or_else(|| self.today());
                let time = time.unwrap_or(self.time_of_day);

                (kind, self.options.zone.resolve_local(&date.and_time(time))?)
            }
        };

        self.time_of_day = selected.time();
        self.selection = Some(selected.clone());
        self.show_selected();

        Ok(self.fire(kind, selected))
    }

    // ---- rendering ----

    /// Content of the text field.
    pub fn text(&self) -> String {
        self.selection
            .as_ref()
            .map(|selected| self.text_format.format(selected, self.options.display_mode))
            .unwrap_or_default()
    }

    pub fn today_label(&self) -> String {
        format!(
            "{}{}",
            self.options.locale.today_label(),
            self.options.locale.format_full_date(self.today())
        )
    }

    /// Localized title of the displayed month, e.g. `February 2024`.
    pub fn month_title(&self) -> String {
        format!(
            "{} {}",
            self.options.locale.month_name(self.cursor.month()),
            self.cursor.year()
        )
    }

    pub fn week_layout(&self) -> WeekLayout {
        self.options.locale.week_layout()
    }

    pub fn weekday_labels(&self, long: bool) -> Vec<&'static str> {
        let locale = &self.options.locale;
        self.week_layout()
            .weekdays()
            .iter()
            .map(|weekday| {
                if long {
                    locale.weekday_long(*weekday)
                } else {
                    locale.weekday_short(*weekday)
                }
            })
            .collect()
    }

    /// Grid of the displayed month with selection and today marked.
    pub fn grid(&self) -> CalendarGrid {
        let mut grid = CalendarGrid::build(
            self.cursor,
            self.options.locale.first_day(),
            self.options.week_numbers,
        );
        grid.mark_selected(self.selection.as_ref().map(|s| s.date_naive()));
        if self.options.today_visible {
            grid.mark_today(Some(self.today()));
        }
        grid
    }

    // ---- options ----

    pub fn set_locale(&mut self, locale: Locale) {
        self.options.locale = locale;
        self.text_format = self.options.text_format();
    }

    pub fn set_week_numbers_visible(&mut self, visible: bool) {
        self.options.week_numbers = visible;
    }

    pub fn set_today_visible(&mut self, visible: bool) {
        self.options.today_visible = visible;
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.options.display_mode = mode;
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.options.text_color = color;
    }

    pub fn set_weekend_color(&mut self, color: Color) {
        self.options.weekend_color = color;
    }

    pub fn set_auto_close(&mut self, auto_close: bool) {
        self.options.auto_close = auto_close;
    }

    pub fn set_date_format(&mut self, date_format: Option<String>) {
        self.options.date_format = date_format;
        self.text_format = self.options.text_format();
    }

    pub fn set_time_format(&mut self, time_format: String) {
        self.options.time_format = time_format;
        self.text_format = self.options.text_format();
    }

    /// Switches the zone, the selection keeps its instant.
    pub fn set_zone(&mut self, zone: Zone) {
        self.selection = self
            .selection
            .take()
            .map(|selected| selected.with_timezone(&zone));
        if let Some(selected) = &self.selection {
            self.time_of_day = selected.time();
        }
        self.options.zone = zone;
    }
}

impl Default for DatePicker {
    fn default() -> Self {
        DatePicker::new(PickerOptions::default())
    }
}
