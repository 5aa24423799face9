//! Prompt templates for generation and edit requests

use crate::types::StyleCategory;

/// Prompt for reconstructing the sketch in one style
#[must_use]
pub fn generation_prompt(style: StyleCategory, variant: u8) -> String {
    format!(
        "TASK: Professional network diagram reconstruction (Variant {variant}).\n\
         Analyze the uploaded sketch and create a clean, digital version based on the instructions below.\n\
         \n\
         STYLE CATEGORY: {label}\n\
         {instructions}\n\
         \n\
         RULES:\n\
         1. TOPOLOGY: Map all nodes and connections from the sketch accurately.\n\
         2. LABELS: Keep English labels, IP addresses, and Models. Translate Japanese labels to English.\n\
         3. BACKGROUND: Pure white.\n",
        label = style.label(),
        instructions = style.style_instructions(),
    )
}

/// Prompt for modifying an existing render
///
/// The request carries two images: the original sketch first, the current
/// render second.
#[must_use]
pub fn edit_prompt(style: StyleCategory, instruction: &str) -> String {
    format!(
        "TASK: Modify the network diagram based on the user request.\n\
         \n\
         CONTEXT:\n\
         - Image 1 (First image): The user's original handwritten sketch (Source of truth for topology).\n\
         - Image 2 (Second image): The current AI-generated diagram.\n\
         \n\
         REQUESTED CHANGE: \"{instruction}\"\n\
         \n\
         INSTRUCTIONS:\n\
         1. Take the current diagram (Image 2) and apply the modification described above.\n\
         2. Ensure the base topology still matches the original sketch (Image 1).\n\
         3. MAINTAIN the style of Image 2 ({label}). Do not change the camera angle, icon style, or color scheme unless requested.\n\
         4. Make the modification obvious and accurate.\n\
         5. Output the result as a single, high-quality image on a pure white background.\n",
        instruction = instruction.trim(),
        label = style.label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_prompt_carries_style_and_rules() {
        let prompt = generation_prompt(StyleCategory::TopDown3d, 2);
        assert!(prompt.contains("(Variant 2)"));
        assert!(prompt.contains("STYLE CATEGORY: 3D Flat View"));
        assert!(prompt.contains("Strictly TOP-DOWN"));
        assert!(prompt.contains("TOPOLOGY"));
        assert!(prompt.contains("Translate Japanese labels to English"));
        assert!(prompt.contains("BACKGROUND: Pure white."));
    }

    #[test]
    fn generation_prompts_differ_per_style() {
        let a = generation_prompt(StyleCategory::Flat2d, 1);
        let b = generation_prompt(StyleCategory::Perspective3d, 1);
        assert_ne!(a, b);
        assert!(b.contains("Ethernet/LAN cables"));
    }

    #[test]
    fn edit_prompt_designates_images() {
        let prompt = edit_prompt(StyleCategory::Flat2d, "  move node HUB left ");
        assert!(prompt.contains("REQUESTED CHANGE: \"move node HUB left\""));
        assert!(prompt.contains("Image 1 (First image)"));
        assert!(prompt.contains("Source of truth for topology"));
        assert!(prompt.contains("MAINTAIN the style of Image 2 (2D Standard Icons)"));
        assert!(prompt.contains("camera angle, icon style, or color scheme"));
    }
}
