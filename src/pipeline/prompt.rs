//! Role prompt construction: pure text templates, no I/O.
//!
//! Each template fixes the persona, the analytic task, the focus area and
//! the required output shape (a constrained list of possible issues plus
//! recommended next steps). The build functions only append the inputs;
//! they are total and fully determined by their arguments.

use super::types::Role;

/// Fixed instruction text for a role. The inputs (report text or specialist
/// outputs) are appended by the build functions below.
fn instruction(role: Role) -> &'static str {
    match role {
        Role::Cardiology => {
            "Act like a cardiologist. You will receive a medical report of a patient.\n\
             Task: Review the patient's cardiac workup, including ECG, blood tests, \
             Holter monitor results, and echocardiogram.\n\
             Focus: Determine if there are any subtle signs of cardiac issues that could \
             explain the patient's symptoms. Rule out any underlying heart conditions, \
             such as arrhythmias or structural abnormalities, that might be missed on \
             routine testing.\n\
             Recommendation: Provide guidance on any further cardiac testing or monitoring \
             needed to ensure there are no hidden heart-related concerns. Suggest potential \
             management strategies if a cardiac issue is identified.\n\
             Please only return the possible causes of the patient's symptoms and the \
             recommended next steps."
        }
        Role::Psychology => {
            "Act like a psychologist. You will receive a patient's report.\n\
             Task: Review the patient's report and provide a psychological assessment.\n\
             Focus: Identify any potential mental health issues, such as anxiety, \
             depression, or trauma, that may be affecting the patient's well-being.\n\
             Recommendation: Offer guidance on how to address these mental health \
             concerns, including therapy, counseling, or other interventions.\n\
             Please only return the possible mental health issues and the recommended \
             next steps."
        }
        Role::Pulmonology => {
            "Act like a pulmonologist. You will receive a patient's report.\n\
             Task: Review the patient's report and provide a pulmonary assessment.\n\
             Focus: Identify any potential respiratory issues, such as asthma, COPD, \
             or lung infections, that may be affecting the patient's breathing.\n\
             Recommendation: Offer guidance on how to address these respiratory \
             concerns, including pulmonary function tests, imaging studies, or other \
             interventions.\n\
             Please only return the possible respiratory issues and the recommended \
             next steps."
        }
        Role::Aggregation => {
            "Act like a multidisciplinary team of healthcare professionals.\n\
             You will receive a medical report of a patient visited by a Cardiologist, \
             Psychologist, and Pulmonologist.\n\
             Task: Review the patient's medical report from the Cardiologist, \
             Psychologist, and Pulmonologist, analyze them and come up with a list of \
             3 possible health issues of the patient.\n\
             Just return a list of bullet points of 3 possible health issues of the \
             patient and for each issue provide the reason."
        }
    }
}

/// Prompt for an independent specialist role: instruction plus the report.
///
/// The Aggregation role is built via [`aggregation_prompt`] instead; its
/// inputs are the three specialist outputs, not the raw report.
pub fn specialist_prompt(role: Role, report: &str) -> String {
    let label = match role {
        Role::Cardiology => "Medical Report",
        _ => "Patient's Report",
    };
    format!("{}\n{label}: {report}", instruction(role))
}

/// Prompt for the Aggregation role: instruction plus the three specialist
/// outputs embedded verbatim, in fixed order. Failed outputs are passed
/// through as their failure text, never dropped.
pub fn aggregation_prompt(cardiology: &str, psychology: &str, pulmonology: &str) -> String {
    format!(
        "{}\n- Cardiologist Report: {cardiology}\n- Psychologist Report: {psychology}\n- Pulmonologist Report: {pulmonology}",
        instruction(Role::Aggregation)
    )
}
