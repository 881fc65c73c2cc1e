/// `plural_count(3, "task")` is `"3 tasks"`. Nouns here all pluralise with `s`.
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}
