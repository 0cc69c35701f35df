use super::port::VoiceInfo;

/// Pick the first voice whose name contains any of the preferred names.
///
/// Voices are scanned in the engine's order. `None` means the engine
/// default should be used.
pub fn select_voice(voices: &[VoiceInfo], preferred: &[String]) -> Option<VoiceInfo> {
    voices
        .iter()
        .find(|voice| {
            preferred
                .iter()
                .any(|name| !name.is_empty() && voice.name.contains(name.as_str()))
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preferred() -> Vec<String> {
        vec!["Female".into(), "Google".into(), "Samantha".into()]
    }

    #[test]
    fn test_first_matching_voice_in_engine_order() {
        let voices = vec![
            VoiceInfo::new("Alex", "en-US"),
            VoiceInfo::new("Samantha", "en-US"),
            VoiceInfo::new("Google US English", "en-US"),
        ];

        let chosen = select_voice(&voices, &preferred()).unwrap();
        assert_eq!(chosen.name, "Samantha");
    }

    #[test]
    fn test_no_match_falls_back_to_default() {
        let voices = vec![VoiceInfo::new("Alex", "en-US"), VoiceInfo::new("Fred", "en-US")];
        assert!(select_voice(&voices, &preferred()).is_none());
        assert!(select_voice(&[], &preferred()).is_none());
    }

    #[test]
    fn test_empty_preference_never_matches() {
        let voices = vec![VoiceInfo::new("Alex", "en-US")];
        assert!(select_voice(&voices, &[String::new()]).is_none());
    }
}
