use std::fmt::Write;

use unsegen::base::*;
use unsegen::widget::*;

use crate::calendar::{CalendarGrid, DayCell, GridCell};

use super::{Context, Theme};

/// Calendar popup: navigation header, weekday labels, the month grid, and
/// the time and today lines.
pub struct Popup<'a> {
    context: &'a Context,
    theme: &'a Theme,
    grid: CalendarGrid,
}

impl<'a> Popup<'a> {
    pub fn new(context: &'a Context, theme: &'a Theme) -> Self {
        Popup {
            grid: context.picker().grid(),
            context,
            theme,
        }
    }

    fn columns(&self) -> usize {
        CalendarGrid::COLUMNS + usize::from(self.grid.has_week_numbers())
    }

    fn width(&self) -> usize {
        self.columns() * DayCell::CELL_WIDTH
    }

    fn shows_calendar(&self) -> bool {
        self.context.picker().display_mode().shows_date()
    }

    fn shows_time(&self) -> bool {
        self.context.picker().display_mode().shows_time()
    }

    fn shows_today(&self) -> bool {
        self.shows_calendar() && self.context.picker().today_visible()
    }

    fn height(&self) -> usize {
        let calendar_rows = if self.shows_calendar() {
            2 + CalendarGrid::ROWS
        } else {
            0
        };
        calendar_rows + usize::from(self.shows_time()) + usize::from(self.shows_today())
    }

    fn draw_header<T: CursorTarget>(&self, cursor: &mut Cursor<T>) {
        let title = self.context.picker().month_title();
        let inner = self.width().saturating_sub(8);

        cursor.set_style_modifier(self.theme.header_style);
        let _ = write!(cursor, " « ‹{:^width$}› » ", title, width = inner);
        cursor.fill_and_wrap_line();
    }

    fn draw_weekdays<T: CursorTarget>(&self, cursor: &mut Cursor<T>) {
        let layout = self.grid.layout();

        cursor.set_style_modifier(self.theme.week_style);
        if self.grid.has_week_numbers() {
            let _ = write!(cursor, "{:>width$}", "Wk", width = DayCell::CELL_WIDTH);
        }

        for (column, label) in self.context.picker().weekday_labels(false).iter().enumerate() {
            cursor.set_style_modifier(if layout.is_weekend_column(column) {
                self.theme.weekend_style
            } else {
                self.theme.panel_style
            });
            let label: String = label.chars().take(DayCell::CELL_WIDTH - 1).collect();
            let _ = write!(cursor, "{:>width$}", label, width = DayCell::CELL_WIDTH);
        }
        cursor.fill_and_wrap_line();
    }

    fn draw_day<T: CursorTarget>(&self, cursor: &mut Cursor<T>, cell: &DayCell) {
        let today = if cell.is_today() {
            self.theme.today_day_char
        } else {
            ' '
        };

        let style = if cell.date() == self.context.focus() {
            self.theme.focus_day_style
        } else if cell.is_selected() {
            self.theme.selected_day_style
        } else if cell.is_weekend() {
            self.theme.weekend_style
        } else {
            self.theme.panel_style
        };

        cursor.set_style_modifier(self.theme.panel_style);
        let _ = write!(cursor, "{} ", today);
        cursor.set_style_modifier(style);
        let _ = write!(cursor, "{:>2}", cell.day());
    }

    fn draw_grid<T: CursorTarget>(&self, cursor: &mut Cursor<T>) {
        for row in self.grid.rows() {
            if let Some(week) = row.week_number() {
                cursor.set_style_modifier(self.theme.week_style);
                let _ = write!(cursor, "{:>width$}", week, width = DayCell::CELL_WIDTH);
            }

            for cell in row.days() {
                match cell {
                    GridCell::Day(day) => self.draw_day(cursor, day),
                    _ => {
                        cursor.set_style_modifier(self.theme.panel_style);
                        let _ = write!(cursor, "{:width$}", "", width = DayCell::CELL_WIDTH);
                    }
                }
            }
            cursor.set_style_modifier(self.theme.panel_style);
            cursor.fill_and_wrap_line();
        }
    }

    fn draw_time<T: CursorTarget>(&self, cursor: &mut Cursor<T>) {
        let picker = self.context.picker();
        let time = picker
            .time_of_day()
            .format(&picker.text_format().time_format)
            .to_string();

        cursor.set_style_modifier(self.theme.panel_style);
        let _ = write!(cursor, " - {} + ", time);
        cursor.fill_and_wrap_line();
    }

    fn draw_today<T: CursorTarget>(&self, cursor: &mut Cursor<T>) {
        cursor.set_style_modifier(self.theme.panel_style);
        cursor.write(&self.context.picker().today_label());
        cursor.fill_and_wrap_line();
    }
}

impl Widget for Popup<'_> {
    fn space_demand(&self) -> Demand2D {
        let today_width = if self.shows_today() {
            self.context.picker().today_label().chars().count()
        } else {
            0
        };

        Demand2D {
            width: ColDemand::exact(self.width().max(today_width)),
            height: RowDemand::exact(self.height()),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let mut cursor = Cursor::new(&mut window);

        if self.shows_calendar() {
            self.draw_header(&mut cursor);
            self.draw_weekdays(&mut cursor);
            self.draw_grid(&mut cursor);
        }
        if self.shows_time() {
            self.draw_time(&mut cursor);
        }
        if self.shows_today() {
            self.draw_today(&mut cursor);
        }
    }
}
