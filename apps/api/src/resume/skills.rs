/// Common technical skills looked for in resume text, in reporting order.
pub const COMMON_SKILLS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "react",
    "node.js",
    "fastapi",
    "sql",
    "postgresql",
    "mongodb",
    "aws",
    "docker",
    "kubernetes",
    "machine learning",
    "deep learning",
    "tensorflow",
    "pytorch",
    "git",
    "agile",
    "scrum",
    "rest api",
    "graphql",
];

/// Case-insensitive substring search for each entry of [`COMMON_SKILLS`].
///
/// Substring semantics are deliberate: "java" is reported for "javascript".
pub fn extract_skills(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    COMMON_SKILLS
        .iter()
        .copied()
        .filter(|skill| lower.contains(skill))
        .collect()
}
