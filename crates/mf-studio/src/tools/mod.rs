pub mod affiliate;
pub mod image_gen;
pub mod script_writer;
pub mod seo;
pub mod story_teller;
pub mod storyboard;
pub mod thumbnail;
pub mod translate;
pub mod video_gen;

/// One prompt per non-empty line, the way every batch tool reads its input
/// textarea.
pub fn split_prompts(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_prompts_skips_blank_lines() {
        let prompts = split_prompts("a cat\n\n  \na dog  \n");
        assert_eq!(prompts, vec!["a cat".to_string(), "a dog".to_string()]);
    }

    #[test]
    fn test_split_prompts_empty_input() {
        assert!(split_prompts("").is_empty());
        assert!(split_prompts("\n\n").is_empty());
    }
}
