pub const SMASHDESK_DISPLAY_VERSION: &str = env!("SMASHDESK_DISPLAY_VERSION");
pub const SMASHDESK_BUILD_N: &str = env!("SMASHDESK_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "smashdesk {}\nBuild {}\nSubmission and monitoring client for an antiSMASH-style analysis service",
        SMASHDESK_DISPLAY_VERSION, SMASHDESK_BUILD_N
    )
}
