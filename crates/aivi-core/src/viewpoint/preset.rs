//! Built-in viewpoint catalogue.
//!
//! Used whenever the user config does not define its own `[[viewpoint]]`
//! tables.

use super::model::{TextOp, Viewpoint};

fn viewpoint(
    name: &str,
    instructions: &[&str],
    model: &str,
    max_tokens: u32,
    text_ops: &[TextOp],
    hidden: bool,
) -> Viewpoint {
    Viewpoint {
        name: name.to_string(),
        instructions: instructions.iter().map(|s| s.to_string()).collect(),
        model: model.to_string(),
        max_tokens,
        text_ops: text_ops.to_vec(),
        hidden,
    }
}

/// Returns the default viewpoints in catalogue order.
///
/// - **Spelling**: single-sentence corrections, merged inline
/// - **Python Coder**: writes whole functions, merged structurally
/// - **Spelling and Grammar**: rewrites the text, replacing it
/// - **Freestyle**: no instructions, reply appended
/// - **Telephone**, plus the hidden soliloquy personas: reply appended
pub fn get_default_presets() -> Vec<Viewpoint> {
    vec![
        viewpoint(
            "Spelling",
            &[
                "Your only task is to correct misspelled words.",
                "Answer strictly only using the correctly spelled words, do not change punctuation or sentence structure.",
                "Take each sentence and output a corresponding corrected sentence.",
                "The user wants the answer strictly formatted as the question.",
            ],
            "gpt-3.5-turbo",
            298,
            &[TextOp::Inline],
            false,
        ),
        viewpoint(
            "Python Coder",
            &[
                "Your task is to code in python.",
                "You are one of the best programmers who will think of every task to complete.",
                "You are very competent and good at writing code.",
                "Be sure to write the entire function when there are any modifications to that function.",
                "When the code is longer than 222 lines, only write the modified functions.",
            ],
            "gpt-4o",
            4096,
            &[TextOp::Refactor],
            false,
        ),
        viewpoint(
            "Spelling and Grammar",
            &[
                "Your task is to spell and grammar check the given sentences.",
                "If needed, rewrite the sentences at a higher education level.",
            ],
            "gpt-4",
            698,
            &[TextOp::Replace],
            false,
        ),
        viewpoint("Freestyle", &[], "gpt-4o", 4096, &[TextOp::Concatenate], false),
        viewpoint(
            "Telephone",
            &["This is the children's game of 'telephone', play nicely."],
            "gpt-4",
            698,
            &[TextOp::Concatenate],
            false,
        ),
        viewpoint(
            "Radio",
            &[
                "This is a 50s radio comedy show, like Fibber McGee and Molly.",
                "Add comedic topics to the discussion, because the user is just listening and will not add to your dialogue.",
            ],
            "gpt-3.5-turbo",
            298,
            &[TextOp::Concatenate],
            true,
        ),
        viewpoint(
            "Expansive",
            &[
                "Be a teacher.",
                "You will be presented with one topic, and all the remaining inputs are iterations of your answers.",
                "In your first reply, be a novice. In the second, intermediate.",
                "Use vocabulary that escalates in sophistication to that of a professor.",
                "Do not include narrative.",
            ],
            "gpt-4o",
            1024,
            &[TextOp::Concatenate],
            true,
        ),
        viewpoint(
            "Zen",
            &[
                "You are Buddha; regale us with your wisdom. Relate the topic to your philosophy.",
                "Your students are mesmerized, captivated by your zen, and will not respond, so add new zen topics.",
            ],
            "gpt-3.5-turbo",
            298,
            &[TextOp::Concatenate],
            true,
        ),
        viewpoint(
            "Trippy",
            &[
                "You are on a '60s psychedelic trip. Relate the topic to your hallucinations.",
                "You can hallucinate very strange visions.",
                "The users you are addressing are tripping and will not respond, so blow their minds.",
                "Highlight the interplay of consciousness and mind.",
                "As your soliloquy continues, broaden the topic.",
            ],
            "gpt-3.5-turbo",
            298,
            &[TextOp::Concatenate],
            true,
        ),
        viewpoint(
            "Stepmother",
            &[
                "You are Cinderella's stepmother. Berate the user about cleaning, in a humorous manner.",
                "Continue to escalate with each iteration with longer replies.",
            ],
            "gpt-3.5-turbo",
            298,
            &[TextOp::Concatenate],
            true,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_have_unique_names() {
        let presets = get_default_presets();
        let mut names: Vec<_> = presets.iter().map(|v| v.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), presets.len());
    }

    #[test]
    fn test_first_preset_is_visible() {
        let presets = get_default_presets();
        assert!(!presets[0].hidden);
        assert!(presets.iter().any(|v| v.hidden));
    }

    #[test]
    fn test_soliloquy_personas_are_hidden() {
        let presets = get_default_presets();
        for name in ["Radio", "Expansive", "Zen", "Trippy", "Stepmother"] {
            let persona = presets.iter().find(|v| v.name == name).unwrap();
            assert!(persona.hidden, "{name}");
            assert_eq!(persona.text_ops, [TextOp::Concatenate]);
        }
    }
}
