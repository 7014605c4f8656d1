//! The `studydesk init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("studydesk.toml").exists() {
        println!("studydesk.toml already exists, skipping.");
    } else {
        std::fs::write("studydesk.toml", SAMPLE_CONFIG)?;
        println!("Created studydesk.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point api.base_url in studydesk.toml at your study backend");
    println!("  2. Run: studydesk courses create --name <NAME> --instructor <NAME> --syllabus <FILE>");
    println!("  3. Run: studydesk quiz run --course <ID>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# studydesk configuration

# Delay before an edited note is saved, in milliseconds
autosave_delay_ms = 5000
# Minimum quiz percentage that counts as a pass
pass_threshold = 70
# Notes shown on the dashboard
recent_notes = 5

[api]
base_url = "http://localhost:8000"
timeout_secs = 30
"#;
