//! Prediction result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::domain::{RiskAssessment, RiskBand};
use crate::tui::styles::ClinicalTheme;

/// Outcome of the last submission.
#[derive(Debug, Clone)]
pub enum ResultState {
    Complete { assessment: RiskAssessment },
    /// Generic message only; details stay in the log
    Error { message: String },
}

/// Render the result screen
pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0]);
    match state {
        ResultState::Complete { assessment } => render_assessment(f, chunks[1], assessment),
        ResultState::Error { message } => render_error(f, chunks[1], message),
    }
    render_result_footer(f, chunks[2]);
}

fn render_result_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicalTheme::text()),
        Span::styled("Prediction Result", ClinicalTheme::title()),
        Span::styled(" │ Random forest estimate", ClinicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_assessment(f: &mut Frame, area: Rect, assessment: &RiskAssessment) {
    let block = Block::default()
        .title(Span::styled(" Risk Assessment ", ClinicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Headline
            Constraint::Length(3), // Probability
            Constraint::Length(2), // Label
            Constraint::Min(0),    // Recommendations
        ])
        .margin(1)
        .split(inner);

    let risk_style = ClinicalTheme::risk_band(assessment.band);
    let icon = match assessment.band {
        RiskBand::Low => "OK",
        RiskBand::Moderate | RiskBand::High => "!",
    };

    let headline = Paragraph::new(Line::from(Span::styled(
        format!("{icon} {}", assessment.headline()),
        risk_style.add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(headline, chunks[0]);

    let probability = assessment.prediction.probability.clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(" CVD Probability ", ClinicalTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(ClinicalTheme::border()),
        )
        .gauge_style(risk_style)
        .ratio(probability)
        .label(assessment.percentage.clone());
    f.render_widget(gauge, chunks[1]);

    let label = Paragraph::new(Line::from(vec![
        Span::styled("Predicted class: ", ClinicalTheme::text_secondary()),
        Span::styled(
            assessment.prediction.predicted_label.to_string(),
            ClinicalTheme::text(),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(label, chunks[2]);

    let recommendations: Vec<Line> = assessment
        .recommendations
        .iter()
        .map(|r| {
            Line::from(vec![
                Span::styled("• Recommendation: ", risk_style),
                Span::styled(*r, ClinicalTheme::text()),
            ])
        })
        .collect();
    let recs = Paragraph::new(recommendations).wrap(Wrap { trim: true });
    f.render_widget(recs, chunks[3]);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Error", ClinicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, ClinicalTheme::text())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(ClinicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_result_footer(f: &mut Frame, area: Rect) {
    let content = Line::from(vec![
        Span::styled("[Enter] ", ClinicalTheme::key_hint()),
        Span::styled("New Assessment ", ClinicalTheme::key_desc()),
        Span::styled("[R] ", ClinicalTheme::key_hint()),
        Span::styled("Reference ", ClinicalTheme::key_desc()),
        Span::styled("[Esc] ", ClinicalTheme::key_hint()),
        Span::styled("Quit", ClinicalTheme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(footer, area);
}
