//! Prompt templates and substitution.

/// Asks the model for a one-word verdict on whether the text is about health.
pub const RELEVANCE_TEMPLATE: &str = r#"You are a strict classifier for a herbal medicine assistant.
Decide whether the following text describes health-related symptoms, ailments, or wellness concerns.

Text: "{symptoms}"

Answer with a single word: "yes" if it is health related, or "no" if it is not."#;

/// Asks the model for a six-section markdown remedy plan.
pub const REMEDY_TEMPLATE: &str = r#"You are a knowledgeable herbalist with expertise in traditional and evidence-based herbal medicine.
A user describes the following symptoms: "{symptoms}"

Suggest safe, commonly available herbal remedies for these symptoms. Format your answer in markdown using exactly these sections:

## Recommended Herbs
List 3-5 herbs, each with a one-line explanation of how it helps with these symptoms.

## Preparation Methods
Explain how to prepare each herb (tea, infusion, decoction, tincture, poultice, etc.).

## Dosage & Administration
Give typical adult dosages, frequency, and duration of use.

## Precautions & Contraindications
List side effects, drug interactions, and who should avoid each herb (pregnancy, children, chronic conditions).

## When to See a Doctor
Describe warning signs that require professional medical attention.

## Additional Tips
Offer diet, lifestyle, and self-care suggestions that support recovery.

Keep the tone clear and practical. Do not diagnose. Remind the user that herbal remedies complement, and do not replace, professional medical care."#;

/// Replace every `{name}` placeholder in `template` with its value.
///
/// Placeholders without a value are left as-is. Values are inserted verbatim.
pub fn build_prompt(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |prompt, (name, value)| {
            prompt.replace(&format!("{{{}}}", name), value)
        })
}
