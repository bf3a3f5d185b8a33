//! Fixed page layout for the monthly report.
//!
//! The layout is computed from [`WeeklyStats`] alone and expressed as plain
//! positioned items, so it can be inspected without touching the PDF backend.
//! Coordinates are in millimetres measured from the bottom-left corner of the
//! page, matching the convention of [`printpdf`].

use crate::model::{ReportSelection, StatsRow, WeeklyStats};

/// A4 portrait.
pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;

pub const TITLE_FONT_SIZE: f64 = 20.0;
pub const TABLE_FONT_SIZE: f64 = 12.0;

const LEFT_MARGIN_MM: f64 = 20.0;
const RIGHT_MARGIN_MM: f64 = 20.0;
const TITLE_Y_MM: f64 = 270.0;
const HEADER_Y_MM: f64 = 250.0;
const FIRST_ROW_Y_MM: f64 = 240.0;
const ROW_SPACING_MM: f64 = 10.0;
const RULE_GAP_MM: f64 = 3.0;
const SEPARATOR_OFFSET_MM: f64 = 7.0;
const TOTALS_OFFSET_MM: f64 = 15.0;
const RULE_THICKNESS_PT: f64 = 0.75;

/// Left edge of each table column: week, borrowed, returned, net change.
pub const COLUMN_X_MM: [f64; 4] = [20.0, 65.0, 110.0, 155.0];

pub const HEADER_LABELS: [&str; 4] = ["Week", "Borrowed", "Returned", "Net Change"];

/// Font weight used for a text item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Colour treatment for a text item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tone {
    /// Plain black text.
    #[default]
    Default,
    /// Zero or positive net change.
    Positive,
    /// Negative net change.
    Negative,
}

impl Tone {
    /// Picks the tone for a net change value.
    pub fn for_net(net: i64) -> Self {
        if net >= 0 {
            Tone::Positive
        } else {
            Tone::Negative
        }
    }

    /// RGB components in the `0.0..=1.0` range.
    pub fn rgb(self) -> (f64, f64, f64) {
        match self {
            Tone::Default => (0.0, 0.0, 0.0),
            Tone::Positive => (0.0, 0.5, 0.0),
            Tone::Negative => (0.8, 0.0, 0.0),
        }
    }
}

/// A single run of text drawn at a fixed position.
#[derive(Clone, Debug, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub x_mm: f64,
    pub y_mm: f64,
    pub font_size: f64,
    pub weight: FontWeight,
    pub tone: Tone,
}

impl TextItem {
    fn new(text: impl Into<String>, x_mm: f64, y_mm: f64, font_size: f64) -> Self {
        Self {
            text: text.into(),
            x_mm,
            y_mm,
            font_size,
            weight: FontWeight::Regular,
            tone: Tone::Default,
        }
    }

    fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }
}

/// A horizontal rule separating table sections.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rule {
    pub x_start_mm: f64,
    pub x_end_mm: f64,
    pub y_mm: f64,
    pub thickness_pt: f64,
}

/// Everything that ends up on the single report page.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportLayout {
    title: String,
    texts: Vec<TextItem>,
    rules: Vec<Rule>,
}

impl ReportLayout {
    /// Lays out the title, header, four weekly rows and the totals row.
    pub fn build(stats: &WeeklyStats, selection: ReportSelection) -> Self {
        let title = format!(
            "Library Report - {} {}",
            selection.month_name(),
            selection.year()
        );

        let mut texts = vec![TextItem::new(
            title.clone(),
            LEFT_MARGIN_MM,
            TITLE_Y_MM,
            TITLE_FONT_SIZE,
        )
        .bold()];

        texts.extend(
            HEADER_LABELS
                .iter()
                .zip(COLUMN_X_MM)
                .map(|(label, x)| TextItem::new(*label, x, HEADER_Y_MM, TABLE_FONT_SIZE).bold()),
        );

        let mut rules = vec![rule_at(HEADER_Y_MM - RULE_GAP_MM)];

        let mut last_row_y = FIRST_ROW_Y_MM;
        for (index, row) in stats.rows().iter().enumerate() {
            last_row_y = FIRST_ROW_Y_MM - ROW_SPACING_MM * index as f64;
            texts.extend(row_items(row, last_row_y, FontWeight::Regular));
        }

        rules.push(rule_at(last_row_y - SEPARATOR_OFFSET_MM));
        texts.extend(row_items(
            &stats.totals(),
            last_row_y - TOTALS_OFFSET_MM,
            FontWeight::Bold,
        ));

        Self {
            title,
            texts,
            rules,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn texts(&self) -> &[TextItem] {
        &self.texts
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn page_size_mm(&self) -> (f64, f64) {
        (PAGE_WIDTH_MM, PAGE_HEIGHT_MM)
    }
}

fn rule_at(y_mm: f64) -> Rule {
    Rule {
        x_start_mm: LEFT_MARGIN_MM,
        x_end_mm: PAGE_WIDTH_MM - RIGHT_MARGIN_MM,
        y_mm,
        thickness_pt: RULE_THICKNESS_PT,
    }
}

fn row_items(row: &StatsRow, y_mm: f64, weight: FontWeight) -> [TextItem; 4] {
    let cell = |text: String, column: usize| {
        let mut item = TextItem::new(text, COLUMN_X_MM[column], y_mm, TABLE_FONT_SIZE);
        item.weight = weight;
        item
    };

    [
        cell(row.label.clone(), 0),
        cell(row.borrowed.to_string(), 1),
        cell(row.returned.to_string(), 2),
        cell(row.net.to_string(), 3).with_tone(Tone::for_net(row.net)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection() -> ReportSelection {
        ReportSelection::new(2, 2024).expect("valid selection")
    }

    fn column(layout: &ReportLayout, x: f64) -> Vec<&TextItem> {
        layout
            .texts()
            .iter()
            .filter(|item| item.x_mm == x && item.font_size == TABLE_FONT_SIZE)
            .collect()
    }

    #[test]
    fn title_names_month_and_year() {
        let layout = ReportLayout::build(&WeeklyStats::default(), selection());
        assert_eq!(layout.title(), "Library Report - March 2024");
        assert_eq!(layout.texts()[0].text, layout.title());
        assert_eq!(layout.texts()[0].weight, FontWeight::Bold);
    }

    #[test]
    fn header_then_four_weeks_then_totals() {
        let layout = ReportLayout::build(&WeeklyStats::default(), selection());
        let labels: Vec<_> = column(&layout, COLUMN_X_MM[0])
            .into_iter()
            .map(|item| item.text.as_str())
            .collect();

        assert_eq!(
            labels,
            ["Week", "Week 1", "Week 2", "Week 3", "Week 4", "Total"]
        );

        let net_header = column(&layout, COLUMN_X_MM[3])[0];
        assert_eq!(net_header.text, "Net Change");
    }

    #[test]
    fn rows_run_top_to_bottom_inside_the_page() {
        let layout = ReportLayout::build(&WeeklyStats::default(), selection());
        let ys: Vec<f64> = column(&layout, COLUMN_X_MM[0])
            .iter()
            .map(|item| item.y_mm)
            .collect();

        assert!(ys.windows(2).all(|pair| pair[0] > pair[1]));
        assert!(ys.iter().all(|&y| y > 0.0 && y < PAGE_HEIGHT_MM));
        for rule in layout.rules() {
            assert!(rule.x_end_mm <= PAGE_WIDTH_MM);
        }
    }

    #[test]
    fn net_cells_follow_sign() {
        let stats = WeeklyStats {
            borrowed: [5, 0, 2, 1],
            returned: [1, 3, 2, 0],
        };
        let layout = ReportLayout::build(&stats, selection());
        let net: Vec<_> = column(&layout, COLUMN_X_MM[3]).into_iter().skip(1).collect();

        let values: Vec<_> = net.iter().map(|item| item.text.as_str()).collect();
        assert_eq!(values, ["4", "-3", "0", "1", "2"]);

        let tones: Vec<_> = net.iter().map(|item| item.tone).collect();
        assert_eq!(
            tones,
            [
                Tone::Positive,
                Tone::Negative,
                Tone::Positive,
                Tone::Positive,
                Tone::Positive
            ]
        );
    }

    #[test]
    fn negative_total_is_flagged() {
        let stats = WeeklyStats {
            borrowed: [0, 1, 0, 0],
            returned: [2, 0, 0, 3],
        };
        let layout = ReportLayout::build(&stats, selection());
        let total = layout
            .texts()
            .iter()
            .filter(|item| item.x_mm == COLUMN_X_MM[3])
            .last()
            .expect("totals row present");

        assert_eq!(total.text, "-4");
        assert_eq!(total.tone, Tone::Negative);
        assert_eq!(total.weight, FontWeight::Bold);
    }
}
