// SPDX-License-Identifier: GPL-3.0-only

//! Fluent localization for user-visible strings
//!
//! Messages live in `i18n/<lang>/qrreader.ftl` and are embedded into the
//! binary. Use the [`fl!`](crate::fl) macro to look them up.

use i18n_embed::{
    DefaultLocalizer, LanguageLoader, Localizer,
    fluent::{FluentLanguageLoader, fluent_language_loader},
    unic_langid::LanguageIdentifier,
};
use rust_embed::RustEmbed;
use std::sync::LazyLock;

/// Applies the requested languages, falling back to English.
pub fn init(requested_languages: &[LanguageIdentifier]) {
    if let Err(why) = localizer().select(requested_languages) {
        tracing::error!(error = %why, "Failed to load fluent localizations");
    }
    // Reloading replaces the bundles, which resets isolation
    LANGUAGE_LOADER.set_use_isolating(false);
}

#[must_use]
pub fn localizer() -> Box<dyn Localizer> {
    Box::from(DefaultLocalizer::new(&*LANGUAGE_LOADER, &Localizations))
}

#[derive(RustEmbed)]
#[folder = "i18n/"]
struct Localizations;

pub static LANGUAGE_LOADER: LazyLock<FluentLanguageLoader> = LazyLock::new(|| {
    let loader: FluentLanguageLoader = fluent_language_loader!();

    loader
        .load_fallback_language(&Localizations)
        .expect("Error while loading fallback language");
    // Placeables carry scanned text verbatim, without U+2068/U+2069 marks
    loader.set_use_isolating(false);

    loader
});

/// Looks up a localized message, optionally with fluent arguments.
#[macro_export]
macro_rules! fl {
    ($message_id:literal) => {{
        i18n_embed_fl::fl!($crate::i18n::LANGUAGE_LOADER, $message_id)
    }};

    ($message_id:literal, $($args:expr),*) => {{
        i18n_embed_fl::fl!($crate::i18n::LANGUAGE_LOADER, $message_id, $($args), *)
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_placeables_are_not_isolated() {
        let body = crate::fl!("scanned-content", content = "ABC123");
        assert_eq!(body, "Content: ABC123");
    }
}
