//! Indicator descriptions shown beside the form.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::ClinicalTheme;

const INDICATORS: [(&str, &str); 9] = [
    (
        "Hypertension",
        "Persistently elevated arterial blood pressure, commonly systolic ≥ 140 mmHg or \
         diastolic ≥ 90 mmHg. A major risk factor for stroke, coronary artery disease, \
         heart failure and chronic kidney disease.",
    ),
    (
        "Dyslipidemia",
        "Abnormal blood lipid levels such as elevated total or LDL cholesterol, \
         triglycerides, or low HDL cholesterol. A critical risk factor for atherosclerosis.",
    ),
    (
        "Self-Rated Health (SRH)",
        "The individual's overall rating of their health, from Excellent to Very Poor. \
         An independent predictor of mortality, functional decline and hospitalization.",
    ),
    (
        "Number of ADL Difficulties",
        "Basic self-care tasks the person cannot complete independently: bathing, dressing, \
         eating, toileting, transferring and continence (six domains).",
    ),
    (
        "TyG-BMI Index",
        "Triglyceride-glucose index combined with body mass index. A low-cost composite \
         marker of insulin resistance and adiposity.",
    ),
    (
        "Waist Circumference (cm)",
        "Reflects visceral adiposity more directly than BMI. Elevated values signify \
         central obesity and raise the risk of CVD and type 2 diabetes.",
    ),
    (
        "White Blood Cell Count (x10^3/uL)",
        "Leukocytes in peripheral blood. High counts often indicate infection or \
         inflammation; low counts may suggest marrow suppression.",
    ),
    (
        "Platelet Count (x10^9/L)",
        "Platelets are critical for hemostasis. Abnormal counts arise from marrow \
         disorders, inflammation, infection or medication effects.",
    ),
    (
        "Serum Creatinine/Cystatin C Ratio",
        "Reflects muscle mass and renal function. A lower ratio is associated with \
         sarcopenia and higher mortality in CKD patients.",
    ),
];

pub fn render_reference(f: &mut Frame, area: Rect) {
    let mut lines = Vec::with_capacity(INDICATORS.len() * 3);
    for (name, description) in INDICATORS {
        lines.push(Line::from(Span::styled(name, ClinicalTheme::subtitle())));
        lines.push(Line::from(Span::styled(
            description,
            ClinicalTheme::text_secondary(),
        )));
        lines.push(Line::from(""));
    }

    let panel = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Span::styled(" Indicator Descriptions ", ClinicalTheme::title()))
                .borders(Borders::ALL)
                .border_style(ClinicalTheme::border()),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(panel, area);
}
