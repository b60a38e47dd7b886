use chrono::{Datelike, Duration, Local, Month, NaiveDate, Weekday};
use std::cmp::Ordering;
use std::fmt::{self, Display, Write};
use std::ops::{Add, Sub};

use crate::locale::Locale;

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_of_month(month: &Month, year: i32) -> u32 {
    match month {
        Month::February if is_leap_year(year) => 29,
        Month::February => 28,
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

/// Number of blank cells before day 1 in a week starting on `first_day`.
pub fn leading_offset(first_of_month: Weekday, first_day: Weekday) -> u32 {
    (first_of_month.num_days_from_monday() + 7 - first_day.num_days_from_monday()) % 7
}

/// A displayed month. Always denotes a valid year/month pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthIndex {
    index: Month,
    year: i32,
}

impl MonthIndex {
    // One year inside chrono's limits
    const MIN_YEAR: i32 = -262_142;
    const MAX_YEAR: i32 = 262_141;

    pub fn new(index: Month, year: i32) -> Self {
        MonthIndex {
            index,
            year: year.clamp(Self::MIN_YEAR, Self::MAX_YEAR),
        }
    }

    pub fn from_parts(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(MonthIndex::new(MONTHS[month as usize - 1], year))
        } else {
            None
        }
    }

    pub fn month(&self) -> Month {
        self.index
    }

    pub fn month_number(&self) -> u32 {
        self.index.number_from_month()
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn num_days(&self) -> u32 {
        days_of_month(&self.index, self.year)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month_number(), 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month_number(), day)
    }

    pub fn contains<T: Datelike>(&self, date: &T) -> bool {
        date.year() == self.year && date.month() == self.month_number()
    }

    pub fn next(&self) -> Self {
        *self + 1
    }

    pub fn prev(&self) -> Self {
        *self - 1
    }

    pub fn add_months(&self, delta: i32) -> Self {
        let total = self.year as i64 * 12 + self.index.number_from_month() as i64 - 1 + delta as i64;
        let year = total.div_euclid(12);
        let month0 = total.rem_euclid(12) as usize;

        if year < Self::MIN_YEAR as i64 {
            MonthIndex::new(Month::January, Self::MIN_YEAR)
        } else if year > Self::MAX_YEAR as i64 {
            MonthIndex::new(Month::December, Self::MAX_YEAR)
        } else {
            MonthIndex::new(MONTHS[month0], year as i32)
        }
    }

    pub fn add_years(&self, delta: i32) -> Self {
        MonthIndex::new(self.index, self.year.saturating_add(delta))
    }
}

impl Default for MonthIndex {
    fn default() -> Self {
        MonthIndex::from(Local::now().date_naive())
    }
}

impl<T: Datelike> From<T> for MonthIndex {
    fn from(m: T) -> Self {
        MonthIndex::new(MONTHS[m.month0() as usize], m.year())
    }
}

impl Add<i32> for MonthIndex {
    type Output = MonthIndex;
    fn add(self, rhs: i32) -> Self::Output {
        self.add_months(rhs)
    }
}

impl Sub<i32> for MonthIndex {
    type Output = MonthIndex;
    fn sub(self, rhs: i32) -> Self::Output {
        self.add_months(rhs.saturating_neg())
    }
}

impl PartialOrd for MonthIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MonthIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.year.cmp(&other.year).then_with(|| {
            self.index
                .number_from_month()
                .cmp(&other.index.number_from_month())
        })
    }
}

impl Display for MonthIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month_number())
    }
}

/// The seven weekdays in display order, starting with a locale's first day of week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekLayout {
    days: [Weekday; 7],
}

impl WeekLayout {
    pub fn new(first_day: Weekday) -> Self {
        let mut days = [first_day; 7];
        for idx in 1..days.len() {
            days[idx] = days[idx - 1].succ();
        }
        WeekLayout { days }
    }

    pub fn first_day(&self) -> Weekday {
        self.days[0]
    }

    pub fn weekdays(&self) -> &[Weekday; 7] {
        &self.days
    }

    pub fn column_of(&self, weekday: Weekday) -> usize {
        leading_offset(weekday, self.first_day()) as usize
    }

    pub fn is_weekend_column(&self, column: usize) -> bool {
        self.days.get(column).map_or(false, |day| is_weekend(*day))
    }
}

pub fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    date: NaiveDate,
    selected: bool,
    today: bool,
}

impl DayCell {
    pub const CELL_WIDTH: usize = 4;

    fn new(date: NaiveDate) -> Self {
        DayCell {
            date,
            selected: false,
            today: false,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn is_weekend(&self) -> bool {
        is_weekend(self.weekday())
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_today(&self) -> bool {
        self.today
    }
}

impl Display for DayCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let today = if self.today { '*' } else { ' ' };
        let focus = if self.selected { '>' } else { ' ' };

        write!(f, "{}{}{:>2}", today, focus, self.day())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCell {
    Blank,
    Day(DayCell),
    Week(u32),
}

impl GridCell {
    pub fn as_day(&self) -> Option<&DayCell> {
        match self {
            GridCell::Day(cell) => Some(cell),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    cells: Vec<GridCell>,
}

impl GridRow {
    /// All cells including a leading week number cell.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn week_number(&self) -> Option<u32> {
        match self.cells.first() {
            Some(GridCell::Week(week)) => Some(*week),
            _ => None,
        }
    }

    /// The seven weekday cells of the row.
    pub fn days(&self) -> &[GridCell] {
        let skip = if self.week_number().is_some() { 1 } else { 0 };
        &self.cells[skip..]
    }

    pub fn is_blank(&self) -> bool {
        self.days().iter().all(|cell| *cell == GridCell::Blank)
    }
}

/// Layout of one month as rows of weeks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    month: MonthIndex,
    layout: WeekLayout,
    rows: Vec<GridRow>,
}

impl CalendarGrid {
    pub const COLUMNS: usize = 7;
    pub const ROWS: usize = 6;

    pub fn build(month: MonthIndex, first_day: Weekday, week_numbers: bool) -> Self {
        let layout = WeekLayout::new(first_day);
        let first = month.first_day();
        let offset = leading_offset(first.weekday(), first_day) as usize;

        let cells: Vec<GridCell> = std::iter::repeat_with(|| GridCell::Blank)
            .take(offset)
            .chain(
                first
                    .iter_days()
                    .take(month.num_days() as usize)
                    .map(|date| GridCell::Day(DayCell::new(date))),
            )
            .chain(std::iter::repeat_with(|| GridCell::Blank))
            .take(Self::ROWS * Self::COLUMNS)
            .collect();

        let rows = cells
            .chunks(Self::COLUMNS)
            .enumerate()
            .map(|(row_idx, days)| {
                let mut cells = Vec::with_capacity(Self::COLUMNS + 1);
                if week_numbers {
                    let reference = days
                        .iter()
                        .find_map(GridCell::as_day)
                        .map(DayCell::date)
                        .or_else(|| {
                            first.checked_add_signed(Duration::days(
                                (row_idx * Self::COLUMNS) as i64 - offset as i64,
                            ))
                        });
                    cells.push(GridCell::Week(
                        reference.map_or(0, |date| date.iso_week().week()),
                    ));
                }
                cells.extend_from_slice(days);
                GridRow { cells }
            })
            .collect();

        CalendarGrid {
            month,
            layout,
            rows,
        }
    }

    pub fn month(&self) -> MonthIndex {
        self.month
    }

    pub fn layout(&self) -> &WeekLayout {
        &self.layout
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn has_week_numbers(&self) -> bool {
        self.rows.iter().any(|row| row.week_number().is_some())
    }

    pub fn day_cells(&self) -> impl Iterator<Item = &DayCell> {
        self.rows
            .iter()
            .flat_map(|row| row.days().iter())
            .filter_map(GridCell::as_day)
    }

    pub fn leading_blanks(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.days().iter())
            .take_while(|cell| cell.as_day().is_none())
            .count()
    }

    pub fn trailing_blanks(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.days().iter())
            .rev()
            .take_while(|cell| cell.as_day().is_none())
            .count()
    }

    /// Row and weekday column of `day`, not counting the week number column.
    pub fn position_of(&self, day: u32) -> Option<(usize, usize)> {
        self.rows.iter().enumerate().find_map(|(row_idx, row)| {
            row.days()
                .iter()
                .position(|cell| cell.as_day().map_or(false, |c| c.day() == day))
                .map(|col| (row_idx, col))
        })
    }

    pub fn selected(&self) -> Option<&DayCell> {
        self.day_cells().find(|cell| cell.selected)
    }

    pub fn today(&self) -> Option<&DayCell> {
        self.day_cells().find(|cell| cell.today)
    }

    pub fn mark_selected(&mut self, date: Option<NaiveDate>) {
        self.day_cells_mut()
            .for_each(|cell| cell.selected = Some(cell.date) == date);
    }

    pub fn mark_today(&mut self, date: Option<NaiveDate>) {
        self.day_cells_mut()
            .for_each(|cell| cell.today = Some(cell.date) == date);
    }

    fn day_cells_mut(&mut self) -> impl Iterator<Item = &mut DayCell> {
        self.rows.iter_mut().flat_map(|row| {
            row.cells.iter_mut().filter_map(|cell| match cell {
                GridCell::Day(day) => Some(day),
                _ => None,
            })
        })
    }

    /// Plain text rendering, one line per row, used for non-interactive output.
    pub fn render_text(&self, locale: &Locale) -> String {
        let width = DayCell::CELL_WIDTH;
        let mut out = String::new();

        let title = format!(
            "{} {}",
            locale.month_name(self.month.month()),
            self.month.year()
        );
        let total_width = width * (Self::COLUMNS + usize::from(self.has_week_numbers()));
        // Writing to a String cannot fail
        let _ = writeln!(out, "{:^width$}", title, width = total_width);

        if self.has_week_numbers() {
            let _ = write!(out, "{:>width$}", "Wk", width = width);
        }
        for weekday in self.layout.weekdays() {
            let label: String = locale.weekday_short(*weekday).chars().take(3).collect();
            let _ = write!(out, "{:>width$}", label, width = width);
        }
        out.push('\n');

        for row in &self.rows {
            for cell in row.cells() {
                let _ = match cell {
                    GridCell::Blank => write!(out, "{:width$}", "", width = width),
                    GridCell::Week(week) => write!(out, "{:>width$}", week, width = width),
                    GridCell::Day(day) => write!(out, "{}", day),
                };
            }
            out.push('\n');
        }

        out
    }
}

/// English rendering, see [`CalendarGrid::render_text`].
impl Display for CalendarGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_text(&Locale::fallback()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn grid(year: i32, month: u32, first_day: Weekday, weeks: bool) -> CalendarGrid {
        CalendarGrid::build(
            MonthIndex::from_parts(year, month).unwrap(),
            first_day,
            weeks,
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_per_month() {
        assert_eq!(days_of_month(&Month::February, 2024), 29);
        assert_eq!(days_of_month(&Month::February, 2023), 28);
        assert_eq!(days_of_month(&Month::February, 1900), 28);
        assert_eq!(days_of_month(&Month::February, 2000), 29);
        assert_eq!(days_of_month(&Month::April, 2023), 30);
        assert_eq!(days_of_month(&Month::December, 2023), 31);
    }

    #[test]
    fn every_month_covers_every_day_once() {
        for &first_day in &[Weekday::Mon, Weekday::Sun] {
            for year in 1999..=2030 {
                for month in 1..=12 {
                    let g = grid(year, month, first_day, false);
                    let idx = MonthIndex::from_parts(year, month).unwrap();

                    assert_eq!(g.rows().len(), CalendarGrid::ROWS);
                    assert!(g.rows().iter().all(|r| r.cells().len() == 7));

                    let days: Vec<u32> = g.day_cells().map(DayCell::day).collect();
                    let expected: Vec<u32> = (1..=idx.num_days()).collect();
                    assert_eq!(days, expected);

                    let offset = leading_offset(idx.first_day().weekday(), first_day) as usize;
                    assert_eq!(g.leading_blanks(), offset);
                    assert_eq!(
                        g.trailing_blanks(),
                        CalendarGrid::ROWS * 7 - offset - idx.num_days() as usize
                    );
                }
            }
        }
    }

    #[test]
    fn february_2024_monday_first() {
        let g = grid(2024, 2, Weekday::Mon, false);

        assert_eq!(g.leading_blanks(), 3);
        assert_eq!(g.day_cells().count(), 29);
        assert_eq!(g.position_of(1), Some((0, 3)));
        assert_eq!(g.position_of(29), Some((4, 3)));
        assert_eq!(g.trailing_blanks(), 3 + 7);
        assert!(g.rows()[5].is_blank());
    }

    #[test]
    fn february_2024_sunday_first() {
        let g = grid(2024, 2, Weekday::Sun, false);

        assert_eq!(g.leading_blanks(), 4);
        assert_eq!(g.position_of(1), Some((0, 4)));
    }

    #[test]
    fn week_layout_rotation() {
        let monday = WeekLayout::new(Weekday::Mon);
        assert_eq!(monday.weekdays()[0], Weekday::Mon);
        assert_eq!(monday.weekdays()[6], Weekday::Sun);
        assert!(monday.is_weekend_column(5));
        assert!(monday.is_weekend_column(6));
        assert!(!monday.is_weekend_column(0));

        let sunday = WeekLayout::new(Weekday::Sun);
        assert_eq!(sunday.weekdays()[0], Weekday::Sun);
        assert_eq!(sunday.weekdays()[6], Weekday::Sat);
        assert_eq!(sunday.column_of(Weekday::Mon), 1);
        assert!(sunday.is_weekend_column(0));
    }

    #[test]
    fn iso_week_numbers_at_year_start() {
        // 2015 starts on a Thursday: Jan 1 is in week 1
        assert_eq!(date(2015, 1, 1).iso_week().week(), 1);
        let g = grid(2015, 1, Weekday::Mon, true);
        assert_eq!(g.rows()[0].week_number(), Some(1));
        assert_eq!(g.rows()[1].week_number(), Some(2));

        // 2021 starts on a Friday: the first row belongs to week 53 of 2020
        let g = grid(2021, 1, Weekday::Mon, true);
        assert_eq!(g.rows()[0].week_number(), Some(53));
        assert_eq!(g.rows()[1].week_number(), Some(1));
    }

    #[test]
    fn iso_week_numbers_at_year_end() {
        // 2015 ends on a Thursday: Dec 31 is in week 53
        assert_eq!(date(2015, 12, 31).iso_week().week(), 53);
        let g = grid(2015, 12, Weekday::Mon, true);
        let last_row = g
            .rows()
            .iter()
            .rev()
            .find(|row| !row.is_blank())
            .unwrap();
        assert_eq!(last_row.week_number(), Some(53));

        // 2024 ends on a Tuesday: Dec 30/31 already belong to week 1 of 2025
        let g = grid(2024, 12, Weekday::Mon, true);
        let (row, _) = g.position_of(31).unwrap();
        assert_eq!(g.rows()[row].week_number(), Some(1));

        // December 2025 leaves the last row blank, it continues with week 2 of 2026
        let g = grid(2025, 12, Weekday::Mon, true);
        assert_eq!(g.rows()[4].week_number(), Some(1));
        assert!(g.rows()[5].is_blank());
        assert_eq!(g.rows()[5].week_number(), Some(2));
    }

    #[test]
    fn week_column_comes_first() {
        let g = grid(2024, 2, Weekday::Mon, true);
        assert!(g.has_week_numbers());
        for row in g.rows() {
            assert_eq!(row.cells().len(), 8);
            assert_eq!(row.days().len(), 7);
        }
        assert_eq!(g.rows()[0].week_number(), Some(5));
    }

    #[test]
    fn marks_are_unique() {
        let mut g = grid(2024, 2, Weekday::Mon, false);
        g.mark_selected(Some(date(2024, 2, 14)));
        g.mark_today(Some(date(2024, 2, 29)));

        assert_eq!(g.day_cells().filter(|c| c.is_selected()).count(), 1);
        assert_eq!(g.selected().map(DayCell::day), Some(14));
        assert_eq!(g.today().map(DayCell::day), Some(29));

        // Selection in another month is not visible
        g.mark_selected(Some(date(2024, 3, 14)));
        assert!(g.selected().is_none());
    }

    #[test]
    fn month_index_arithmetic() {
        let jan = MonthIndex::from_parts(2024, 1).unwrap();
        assert_eq!(jan - 1, MonthIndex::from_parts(2023, 12).unwrap());
        assert_eq!(jan + 11, MonthIndex::from_parts(2024, 12).unwrap());
        assert_eq!(jan + 12, MonthIndex::from_parts(2025, 1).unwrap());
        assert_eq!(jan - 25, MonthIndex::from_parts(2021, 12).unwrap());
        assert_eq!(jan.add_years(-3), MonthIndex::from_parts(2021, 1).unwrap());
        assert!(jan < jan.next());
        assert!(MonthIndex::from_parts(2024, 13).is_none());
        assert!(MonthIndex::from_parts(2024, 0).is_none());
    }

    #[test]
    fn render_plain_text() {
        let locale = Locale::from_str("en_GB").unwrap();
        let mut g = grid(2024, 2, Weekday::Mon, false);
        g.mark_today(Some(date(2024, 2, 1)));

        let text = g.render_text(&locale);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0].trim(), "February 2024");
        assert_eq!(lines[1], " Mon Tue Wed Thu Fri Sat Sun");
        assert_eq!(lines[2], "            *  1   2   3   4");

        // en_US starts the week on Sunday
        let us = grid(2024, 2, Weekday::Sun, true).to_string();
        assert_eq!(us.lines().nth(1), Some("  Wk Sun Mon Tue Wed Thu Fri Sat"));
    }
}
