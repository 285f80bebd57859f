//! Assessment input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{AdlDifficulties, Measurement, RawInput, SelfRatedHealth, YesNo};
use crate::tui::styles::ClinicalTheme;

/// What a field holds.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// One entry of a closed menu
    Choice {
        options: Vec<&'static str>,
        selected: usize,
    },
    /// Free-text number, parsed on submit
    Number {
        measurement: Measurement,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub label: &'static str,
    pub hint: String,
    pub value: FieldValue,
}

impl FormField {
    fn choice(label: &'static str, options: Vec<&'static str>) -> Self {
        Self {
            label,
            hint: "←/→ to change".to_string(),
            value: FieldValue::Choice {
                options,
                selected: 0,
            },
        }
    }

    fn number(measurement: Measurement) -> Self {
        Self {
            label: measurement.label(),
            hint: format!("{} (step {})", measurement.unit(), measurement.step()),
            value: FieldValue::Number {
                measurement,
                text: String::new(),
            },
        }
    }

    fn choice_label(&self) -> Option<&'static str> {
        match &self.value {
            FieldValue::Choice { options, selected } => options.get(*selected).copied(),
            FieldValue::Number { .. } => None,
        }
    }
}

/// Form state: nine fields, four menus followed by five measurements.
pub struct FormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

const HYPERTENSION: usize = 0;
const DYSLIPIDEMIA: usize = 1;
const SELF_RATED_HEALTH: usize = 2;
const ADL: usize = 3;

impl Default for FormState {
    fn default() -> Self {
        let mut fields = vec![
            FormField::choice(
                "Hypertension",
                YesNo::ALL.iter().map(|v| v.label()).collect(),
            ),
            FormField::choice(
                "Dyslipidemia",
                YesNo::ALL.iter().map(|v| v.label()).collect(),
            ),
            FormField::choice(
                "Self-Rated Health",
                SelfRatedHealth::ALL.iter().map(|v| v.label()).collect(),
            ),
            FormField::choice(
                "Number of ADL Difficulties",
                AdlDifficulties::ALL.iter().map(|v| v.label()).collect(),
            ),
        ];
        fields.extend(Measurement::ALL.into_iter().map(FormField::number));

        Self {
            fields,
            selected_field: 0,
            error_message: None,
        }
    }
}

impl FormState {
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        self.selected_field = self
            .selected_field
            .checked_sub(1)
            .unwrap_or(self.fields.len() - 1);
    }

    /// Cycle the selected menu forward (`step = 1`) or backward (`step = -1`).
    pub fn cycle_choice(&mut self, step: isize) {
        if let FieldValue::Choice { options, selected } =
            &mut self.fields[self.selected_field].value
        {
            let n = options.len() as isize;
            *selected = (*selected as isize + step).rem_euclid(n) as usize;
            self.error_message = None;
        }
    }

    /// Add a character to the selected numeric field.
    ///
    /// Only digits and a single decimal point are accepted, so values are
    /// non-negative by construction.
    pub fn input_char(&mut self, c: char) {
        if let FieldValue::Number { text, .. } = &mut self.fields[self.selected_field].value {
            if c.is_ascii_digit() || (c == '.' && !text.contains('.')) {
                text.push(c);
                self.error_message = None;
            }
        }
    }

    pub fn delete_char(&mut self) {
        if let FieldValue::Number { text, .. } = &mut self.fields[self.selected_field].value {
            text.pop();
        }
    }

    pub fn clear_field(&mut self) {
        if let FieldValue::Number { text, .. } = &mut self.fields[self.selected_field].value {
            text.zeroize();
        }
    }

    /// Wipe numeric buffers and reset every menu.
    ///
    /// Called as soon as a submission has been assessed so plaintext values do
    /// not linger in UI state.
    pub fn clear_sensitive(&mut self) {
        for field in &mut self.fields {
            match &mut field.value {
                FieldValue::Number { text, .. } => text.zeroize(),
                FieldValue::Choice { selected, .. } => *selected = 0,
            }
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    /// Read the form into a `RawInput`.
    ///
    /// An empty numeric field reads as 0.0, which validation then reports as
    /// not entered.
    ///
    /// # Errors
    /// Returns a message naming the field when a number does not parse.
    pub fn to_raw_input(&self) -> Result<RawInput, String> {
        let choice = |idx: usize| {
            self.fields[idx]
                .choice_label()
                .ok_or_else(|| format!("{}: no option selected", self.fields[idx].label))
        };
        let yes_no = |idx: usize| {
            choice(idx).and_then(|l| {
                YesNo::from_label(l).ok_or_else(|| format!("{}: unknown option", self.fields[idx].label))
            })
        };

        let self_rated_health = SelfRatedHealth::from_label(choice(SELF_RATED_HEALTH)?)
            .ok_or_else(|| "Self-Rated Health: unknown option".to_string())?;
        let adl_difficulties = AdlDifficulties::from_label(choice(ADL)?)
            .ok_or_else(|| "ADL Difficulties: unknown option".to_string())?;

        let mut input = RawInput {
            hypertension: yes_no(HYPERTENSION)?,
            dyslipidemia: yes_no(DYSLIPIDEMIA)?,
            self_rated_health,
            adl_difficulties,
            tyg_bmi: 0.0,
            waist_circumference: 0.0,
            white_cell_count: 0.0,
            platelet_count: 0.0,
            creatinine_cystatin_ratio: 0.0,
        };

        for field in &self.fields {
            if let FieldValue::Number { measurement, text } = &field.value {
                let value = parse_measurement(text)
                    .ok_or_else(|| format!("{}: Invalid number", field.label))?;
                match measurement {
                    Measurement::TygBmi => input.tyg_bmi = value,
                    Measurement::WaistCircumference => input.waist_circumference = value,
                    Measurement::WhiteCellCount => input.white_cell_count = value,
                    Measurement::PlateletCount => input.platelet_count = value,
                    Measurement::CreatinineCystatinRatio => {
                        input.creatinine_cystatin_ratio = value;
                    }
                }
            }
        }

        Ok(input)
    }

    /// Load a sample patient (no comorbidities, excellent health).
    pub fn load_sample_data(&mut self) {
        let sample = ["8.5", "80.0", "6.0", "250.0", "1.1"];
        let mut values = sample.iter();
        for field in &mut self.fields {
            match &mut field.value {
                FieldValue::Choice { selected, .. } => *selected = 0,
                FieldValue::Number { text, .. } => {
                    if let Some(v) = values.next() {
                        *text = (*v).to_string();
                    }
                }
            }
        }
        // "Yes" is the first menu entry; the sample patient answers "No".
        for idx in [HYPERTENSION, DYSLIPIDEMIA] {
            if let FieldValue::Choice { selected, .. } = &mut self.fields[idx].value {
                *selected = 1;
            }
        }
        self.error_message = None;
    }
}

fn parse_measurement(text: &str) -> Option<f64> {
    if text.is_empty() {
        return Some(0.0);
    }
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Render the assessment form.
pub fn render_form(f: &mut Frame, area: Rect, state: &FormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicalTheme::text()),
        Span::styled("CVD Risk Assessment", ClinicalTheme::title()),
        Span::styled(" │ CKD patient indicators", ClinicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &FormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (state.fields.len() + 1) / 2;
    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(f, columns[1], &state.fields[mid..], mid, state.selected_field);
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let (border_style, title_style) = if is_selected {
            (ClinicalTheme::border_focused(), ClinicalTheme::focused())
        } else {
            (ClinicalTheme::border(), ClinicalTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value = match &field.value {
            FieldValue::Choice { options, selected } => Span::styled(
                format!("‹ {} ›", options.get(*selected).copied().unwrap_or("")),
                ClinicalTheme::text(),
            ),
            FieldValue::Number { text, .. } if text.is_empty() => {
                Span::styled(field.hint.clone(), ClinicalTheme::text_muted())
            }
            FieldValue::Number { text, .. } => Span::styled(text.clone(), ClinicalTheme::text()),
        };

        let cursor = if is_selected && matches!(field.value, FieldValue::Number { .. }) {
            Span::styled("▌", ClinicalTheme::cursor())
        } else {
            Span::raw("")
        };

        let content = Paragraph::new(Line::from(vec![Span::raw(" "), value, cursor])).block(block);
        f.render_widget(content, chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &FormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", ClinicalTheme::danger()),
            Span::styled(err.clone(), ClinicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", ClinicalTheme::key_hint()),
            Span::styled("Navigate ", ClinicalTheme::key_desc()),
            Span::styled("[←→] ", ClinicalTheme::key_hint()),
            Span::styled("Change ", ClinicalTheme::key_desc()),
            Span::styled("[Enter] ", ClinicalTheme::key_hint()),
            Span::styled("Predict Risk ", ClinicalTheme::key_desc()),
            Span::styled("[S] ", ClinicalTheme::key_hint()),
            Span::styled("Sample ", ClinicalTheme::key_desc()),
            Span::styled("[R] ", ClinicalTheme::key_hint()),
            Span::styled("Reference ", ClinicalTheme::key_desc()),
            Span::styled("[Esc] ", ClinicalTheme::key_hint()),
            Span::styled("Quit", ClinicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_form_reads_zero_measurements() {
        let form = FormState::default();
        assert_eq!(form.fields.len(), 9);
        let input = form.to_raw_input().expect("Should read");
        assert_eq!(input.hypertension, YesNo::Yes);
        assert_eq!(input.tyg_bmi, 0.0);
    }

    #[test]
    fn test_sample_data_matches_reference_patient() {
        let mut form = FormState::default();
        form.load_sample_data();
        let input = form.to_raw_input().expect("Should read");
        assert_eq!(input, crate::domain::sample_input());
    }

    #[test]
    fn test_cycle_choice_wraps() {
        let mut form = FormState::default();
        form.selected_field = SELF_RATED_HEALTH;
        form.cycle_choice(-1);
        let input = form.to_raw_input().expect("Should read");
        assert_eq!(input.self_rated_health, SelfRatedHealth::VeryPoor);
        form.cycle_choice(1);
        let input = form.to_raw_input().expect("Should read");
        assert_eq!(input.self_rated_health, SelfRatedHealth::Excellent);
    }

    #[test]
    fn test_numeric_input_rejects_signs_and_second_point() {
        let mut form = FormState::default();
        form.selected_field = 5; // waist circumference
        for c in "-9.2.5x".chars() {
            form.input_char(c);
        }
        match &form.fields[5].value {
            FieldValue::Number { text, .. } => assert_eq!(text, "9.25"),
            other => panic!("unexpected field {other:?}"),
        }
        form.input_char('a');
        form.selected_field = ADL;
        form.input_char('7');
        assert_eq!(form.to_raw_input().expect("read").adl_difficulties.code(), 0);
    }

    #[test]
    fn test_lone_point_is_invalid_number() {
        let mut form = FormState::default();
        form.selected_field = 4;
        form.input_char('.');
        let err = form.to_raw_input().expect_err("must fail");
        assert!(err.starts_with("TyG-BMI Index"));
    }

    #[test]
    fn test_clear_sensitive_wipes_numbers() {
        let mut form = FormState::default();
        form.load_sample_data();
        form.clear_sensitive();
        assert!(form.fields.iter().all(|f| match &f.value {
            FieldValue::Number { text, .. } => text.is_empty(),
            FieldValue::Choice { selected, .. } => *selected == 0,
        }));
    }
}
