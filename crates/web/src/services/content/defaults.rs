//! Built-in content shown until an editor stores a record.

use serde_json::{Value, json};

/// Content types that always resolve, even without a stored record.
pub const KNOWN_TYPES: [&str; 8] = [
    "about",
    "contact",
    "featuredCards",
    "hero",
    "footer",
    "rulesPage",
    "storePage",
    "jobsPage",
];

/// The locale-keyed default document for a content type.
#[must_use]
pub fn builtin(content_type: &str) -> Option<Value> {
    let value = match content_type {
        "hero" => json!({
            "en": {
                "title": "Welcome to Outpost",
                "subtitle": "A roleplay community built by its players.",
                "primaryCta": { "label": "Join the server", "href": "/jobs" },
                "secondaryCta": { "label": "Visit the store", "href": "/store" },
                "backgroundImage": "/assets/hero.jpg"
            },
            "ar": {
                "title": "مرحباً بك في أوتبوست",
                "subtitle": "مجتمع لعب أدوار يبنيه لاعبوه.",
                "primaryCta": { "label": "انضم إلى السيرفر", "href": "/jobs" },
                "secondaryCta": { "label": "زر المتجر", "href": "/store" },
                "backgroundImage": "/assets/hero.jpg"
            }
        }),
        "about" => json!({
            "en": {
                "title": "About us",
                "body": "Outpost is a community server focused on fair play and serious roleplay.",
                "stats": [
                    { "label": "Players", "value": "0" },
                    { "label": "Staff", "value": "0" }
                ]
            },
            "ar": {
                "title": "من نحن",
                "body": "أوتبوست سيرفر مجتمعي يركز على اللعب النظيف ولعب الأدوار الجاد.",
                "stats": [
                    { "label": "اللاعبون", "value": "0" },
                    { "label": "الطاقم", "value": "0" }
                ]
            }
        }),
        "contact" => json!({
            "en": {
                "title": "Contact",
                "body": "Reach the staff team on Discord.",
                "discordUrl": "",
                "email": ""
            },
            "ar": {
                "title": "تواصل معنا",
                "body": "تواصل مع فريق الإدارة عبر ديسكورد.",
                "discordUrl": "",
                "email": ""
            }
        }),
        "featuredCards" => json!({
            "en": {
                "title": "Why play here",
                "cards": [
                    { "title": "Active staff", "body": "Reports are handled around the clock.", "icon": "shield" },
                    { "title": "Custom jobs", "body": "Dozens of whitelisted roles to apply for.", "icon": "briefcase" },
                    { "title": "Fair economy", "body": "No pay-to-win items in the store.", "icon": "scale" }
                ]
            },
            "ar": {
                "title": "لماذا تلعب معنا",
                "cards": [
                    { "title": "طاقم نشط", "body": "تتم معالجة البلاغات على مدار الساعة.", "icon": "shield" },
                    { "title": "وظائف مخصصة", "body": "عشرات الأدوار المتاحة للتقديم.", "icon": "briefcase" },
                    { "title": "اقتصاد عادل", "body": "لا توجد عناصر تمنح أفضلية مدفوعة في المتجر.", "icon": "scale" }
                ]
            }
        }),
        "footer" => json!({
            "en": {
                "copyright": "© Outpost Community",
                "links": [
                    { "label": "Rules", "href": "/rules" },
                    { "label": "Store", "href": "/store" },
                    { "label": "Contact", "href": "/contact" }
                ]
            },
            "ar": {
                "copyright": "© مجتمع أوتبوست",
                "links": [
                    { "label": "القوانين", "href": "/rules" },
                    { "label": "المتجر", "href": "/store" },
                    { "label": "تواصل معنا", "href": "/contact" }
                ]
            }
        }),
        "rulesPage" => json!({
            "en": {
                "title": "Server rules",
                "intro": "Breaking these rules can lead to a warning, a kick or a ban."
            },
            "ar": {
                "title": "قوانين السيرفر",
                "intro": "مخالفة هذه القوانين قد تؤدي إلى تحذير أو طرد أو حظر."
            }
        }),
        "storePage" => json!({
            "en": {
                "title": "Store",
                "intro": "Every purchase supports the server.",
                "emptyCart": "Your cart is empty."
            },
            "ar": {
                "title": "المتجر",
                "intro": "كل عملية شراء تدعم السيرفر.",
                "emptyCart": "سلتك فارغة."
            }
        }),
        "jobsPage" => json!({
            "en": {
                "title": "Jobs",
                "intro": "Apply for a whitelisted role. Staff review every application.",
                "closed": "Applications for this job are closed."
            },
            "ar": {
                "title": "الوظائف",
                "intro": "قدّم على دور مخصص. يراجع الطاقم كل طلب.",
                "closed": "التقديم على هذه الوظيفة مغلق."
            }
        }),
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use outpost_core::Locale;

    use super::*;

    #[test]
    fn test_every_known_type_has_both_locales() {
        for content_type in KNOWN_TYPES {
            let value = builtin(content_type).unwrap_or_default();
            for locale in Locale::ALL {
                assert!(
                    value.get(locale.code()).is_some_and(Value::is_object),
                    "{content_type} is missing {locale}"
                );
            }
        }
    }

    #[test]
    fn test_unknown_type_has_no_default() {
        assert!(builtin("motd").is_none());
    }
}
