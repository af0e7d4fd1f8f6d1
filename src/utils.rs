// src/utils.rs
use anyhow::Result;

const RESUME_EXTENSIONS: &[&str] = &["pdf", "docx"];

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Validate file extension against allowed types
pub fn validate_file_extension(filename: &str, allowed: &[&str]) -> Result<()> {
    let ext = get_file_extension(filename)
        .ok_or_else(|| anyhow::anyhow!("File has no extension: {}", filename))?;

    if !allowed.contains(&ext.as_str()) {
        anyhow::bail!(
            "Unsupported file extension: {}. Allowed: {:?}",
            ext,
            allowed
        );
    }

    Ok(())
}

/// Content type for an uploadable resume
pub fn resume_content_type(file_name: &str) -> Result<&'static str> {
    validate_file_extension(file_name, RESUME_EXTENSIONS)?;
    match get_file_extension(file_name).as_deref() {
        Some("pdf") => Ok("application/pdf"),
        Some("docx") => {
            Ok("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        _ => anyhow::bail!("Unsupported file format: {}", file_name),
    }
}

/// Format a salary for listing, `None` means negotiable
pub fn format_salary(salary: Option<i64>) -> String {
    match salary {
        Some(amount) => {
            let digits = amount.unsigned_abs().to_string();
            let mut grouped = String::new();
            for (i, c) in digits.chars().enumerate() {
                if i > 0 && (digits.len() - i) % 3 == 0 {
                    grouped.push(',');
                }
                grouped.push(c);
            }
            if amount < 0 {
                format!("-{}", grouped)
            } else {
                grouped
            }
        }
        None => "negotiable".to_string(),
    }
}
