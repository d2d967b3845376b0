//! Prompt construction and response extraction

use crate::dependencies::DependencyType;
use crate::detection::RepoAnalysis;
use std::fmt::Write;

const ENHANCEMENT_REQUIREMENTS: &str = "
ENHANCEMENT REQUIREMENTS:
1. Review and optimize the template-based derivation
2. Add missing build inputs or native build inputs based on the project analysis
3. Improve build phases, install phases, or check phases if needed
4. Ensure proper dependency handling
5. Add any missing meta attributes
6. Follow nixpkgs best practices and conventions
7. Keep the structure clean and maintainable

Please provide the enhanced Nix derivation. Return ONLY the complete .nix file content, no explanations.";

const GENERATION_INSTRUCTIONS: &str = "
INSTRUCTIONS:
1. Generate a complete Nix derivation that follows nixpkgs conventions
2. Use the appropriate build function for the detected build system
3. Map the detected dependencies to nixpkgs packages when possible
4. Include proper meta attributes (description, license, maintainers, platforms)
5. Add comments explaining any complex build steps
6. Use modern Nix syntax and best practices
7. Include buildInputs, nativeBuildInputs appropriately
8. For unknown dependencies, add comments suggesting manual mapping
9. Include doCheck = true if tests were detected
10. Ensure the derivation is formatted properly with proper indentation

OUTPUT FORMAT:
Provide ONLY the Nix derivation code without any explanation or markdown formatting.
The derivation should be a complete, valid Nix expression that can be built.
Start with the function signature { ... }: and end with the closing brace.

DERIVATION:
";

/// Prompt asking the model to refine an already rendered template
pub fn enhancement_prompt(analysis: &RepoAnalysis, template_output: &str, documentation: &str) -> String {
    let mut prompt = String::from(
        "You are an expert Nix package maintainer. I have a template-based Nix derivation \
         that needs enhancement and optimization.\n\nCURRENT TEMPLATE-BASED DERIVATION:\n",
    );
    let _ = write!(prompt, "```nix\n{}\n```\n\n", template_output.trim_end());

    prompt.push_str("PROJECT ANALYSIS:\n");
    write_summary(&mut prompt, analysis);
    if !analysis.dependencies.is_empty() {
        let _ = writeln!(prompt, "- Dependencies: {} found", analysis.dependencies.len());
    }

    if !documentation.is_empty() {
        prompt.push_str("\nRELEVANT NIXPKGS DOCUMENTATION:\n");
        prompt.push_str(documentation);
        prompt.push('\n');
    }

    prompt.push_str(ENHANCEMENT_REQUIREMENTS);
    prompt
}

/// Prompt asking the model for a derivation from the analysis alone
pub fn generation_prompt(analysis: &RepoAnalysis, documentation: &str) -> String {
    let mut prompt = String::from(
        "You are an expert Nix package maintainer. Generate a Nix derivation for the \
         following project.\n\nPROJECT ANALYSIS:\n",
    );
    write_summary(&mut prompt, analysis);
    let _ = writeln!(prompt, "- Has Tests: {}", analysis.has_tests);

    if !analysis.build_files.is_empty() {
        prompt.push_str("\nBuild Files Found:\n");
        for file in &analysis.build_files {
            let _ = writeln!(prompt, "- {}", file);
        }
    }

    if !analysis.dependencies.is_empty() {
        prompt.push_str("\nDependencies:\n");
        let groups = [
            (DependencyType::Build, "Build Dependencies"),
            (DependencyType::Runtime, "Runtime Dependencies"),
            (DependencyType::Dev, "Development Dependencies"),
        ];

        for (dep_type, heading) in groups {
            let mut deps = analysis
                .dependencies
                .iter()
                .filter(|d| d.dep_type == dep_type)
                .peekable();
            if deps.peek().is_none() {
                continue;
            }

            let _ = writeln!(prompt, "\n{}:", heading);
            for dep in deps {
                prompt.push_str("- ");
                prompt.push_str(&dep.name);
                if !dep.version.is_empty() {
                    let _ = write!(prompt, " ({})", dep.version);
                }
                if dep.system {
                    prompt.push_str(" [system library]");
                }
                prompt.push('\n');
            }
        }
    }

    if !documentation.is_empty() {
        prompt.push_str("\nRELEVANT NIXPKGS DOCUMENTATION AND EXAMPLES:\n");
        prompt.push_str(documentation);
    }

    prompt.push_str(GENERATION_INSTRUCTIONS);
    prompt
}

fn write_summary(prompt: &mut String, analysis: &RepoAnalysis) {
    let _ = writeln!(prompt, "- Project Name: {}", analysis.project_name);
    let _ = writeln!(prompt, "- Build System: {}", analysis.build_system);
    let _ = writeln!(prompt, "- Primary Language: {}", analysis.language);
    if !analysis.license.is_empty() {
        let _ = writeln!(prompt, "- License: {}", analysis.license);
    }
    if !analysis.description.is_empty() {
        let _ = writeln!(prompt, "- Description: {}", analysis.description);
    }
}

/// Recovers the derivation from a model response: the body of the first
/// ```nix fence, else the first bare fence, else the whole trimmed text.
pub fn extract_derivation(response: &str) -> String {
    fenced_block(response, "```nix")
        .or_else(|| fenced_block(response, "```"))
        .unwrap_or(response)
        .trim()
        .to_string()
}

fn fenced_block<'a>(text: &'a str, opening: &str) -> Option<&'a str> {
    let start = text.find(opening)?;
    let after_opening = &text[start + opening.len()..];
    // skip the rest of the info string line
    let body = match after_opening.find('\n') {
        Some(newline) => &after_opening[newline + 1..],
        None => return None,
    };

    Some(match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    })
}
