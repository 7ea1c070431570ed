// Localized user-facing strings
//
// Only the strings the assistant itself speaks live here; the front ends own
// their own chrome. Unknown language preferences resolve to English.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Telugu,
    Tamil,
    Malayalam,
    Kannada,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::English,
        Language::Hindi,
        Language::Telugu,
        Language::Tamil,
        Language::Malayalam,
        Language::Kannada,
    ];

    /// Label shown in language pickers (English name plus native script)
    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi - हिन्दी",
            Language::Telugu => "Telugu - తెలుగు",
            Language::Tamil => "Tamil - தமிழ்",
            Language::Malayalam => "Malayalam - മലയാളം",
            Language::Kannada => "Kannada - ಕನ್ನಡ",
        }
    }

    fn short_code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Telugu => "te",
            Language::Tamil => "ta",
            Language::Malayalam => "ml",
            Language::Kannada => "kn",
        }
    }

    fn english_name(&self) -> &'static str {
        self.label().split(" - ").next().unwrap_or("English")
    }

    /// Match a preference against full labels, English names or ISO codes.
    ///
    /// Returns `None` for anything unrecognised; see [`Language::resolve`].
    pub fn parse(preference: &str) -> Option<Language> {
        let wanted = preference.trim();
        Language::ALL.into_iter().find(|lang| {
            wanted == lang.label()
                || wanted.eq_ignore_ascii_case(lang.english_name())
                || wanted.eq_ignore_ascii_case(lang.short_code())
        })
    }

    /// Like [`Language::parse`] but falls back to the default language
    pub fn resolve(preference: &str) -> Language {
        Language::parse(preference).unwrap_or_default()
    }

    /// Message returned when no model reply is available
    pub fn no_response(&self) -> &'static str {
        match self {
            Language::English => "Sorry, I couldn't find a matching response for your query.",
            Language::Hindi => "मुझे आपके प्रश्न का मिलान करने वाला उत्तर नहीं मिला।",
            Language::Telugu => "మీ ప్రశ్నకు సరిపడే సమాధానం కనుగొనలేకపోయాను.",
            Language::Tamil => "உங்கள் கேள்விக்கான பதிலை காணவில்லை.",
            Language::Malayalam => {
                "ക്ഷമിക്കണം, നിങ്ങളുടെ ചോദ്യത്തിന് അനുയോജമായ പ്രതികരണം കണ്ടെത്താനായില്ല."
            }
            Language::Kannada => {
                "ಕ್ಷಮಿಸಿ, ನಿಮ್ಮ ಪ್ರಶ್ನೆಗೆ ಹೊಂದುವ ಉತ್ತರವನ್ನು ನಾನು ಕಂಡುಹಿಡಿಯಲಿಲ್ಲ."
            }
        }
    }

    /// Prompt inviting the user to ask a question
    pub fn ask_query(&self) -> &'static str {
        match self {
            Language::English => "Ask your query for legal assistance",
            Language::Hindi => "कानूनी सहायता के लिए अपना प्रश्न पूछें",
            Language::Telugu => "న్యాయ సహాయం కోసం మీ ప్రశ్నను అడగండి",
            Language::Tamil => "சட்ட உதவிக்கு உங்கள் கேள்வியைக் கேளுங்கள்",
            Language::Malayalam => "നിങ്ങളുടെ നിയമ സഹായത്തിനായുള്ള ചോദ്യം ചോദിക്കുക",
            Language::Kannada => "ನಿಮ್ಮ ಕಾನೂನು ಸಹಾಯಕ್ಕಾಗಿ ಪ್ರಶ್ನೆಯನ್ನು ಕೇಳಿ",
        }
    }

    /// Shown while a reply is being generated
    pub fn thinking(&self) -> &'static str {
        match self {
            Language::English => "Thinking ✨...",
            Language::Hindi => "सोच रहे हैं ✨...",
            Language::Telugu => "ఆలోచిస్తున్నాను ✨...",
            Language::Tamil => "சிந்தித்து கொண்டிருக்கிறேன் ✨...",
            Language::Malayalam => "ചിന്തിക്കുന്നു ✨...",
            Language::Kannada => "ಆಲೋಚನೆ ✨...",
        }
    }

    pub fn welcome(&self) -> &'static str {
        match self {
            Language::English => "Welcome",
            Language::Hindi => "स्वागत है",
            Language::Telugu => "స్వాగతం",
            Language::Tamil => "வரவேற்கிறேன்",
            Language::Malayalam => "സ്വാഗതം",
            Language::Kannada => "ಸ್ವಾಗತ",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fallback message for a raw preference string (English if unknown)
pub fn no_response_for(preference: &str) -> &'static str {
    Language::resolve(preference).no_response()
}
