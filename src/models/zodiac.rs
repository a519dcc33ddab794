/// Знак зодиака: код из callback-данных (`zodiac_<code>`) и подпись для профиля.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZodiacSign {
    pub code: &'static str,
    pub label: &'static str,
}

/// Фиксированная таблица из 12 знаков.
pub const ZODIAC_SIGNS: [ZodiacSign; 12] = [
    ZodiacSign { code: "aries", label: "♈️ Овен" },
    ZodiacSign { code: "taurus", label: "♉️ Телец" },
    ZodiacSign { code: "gemini", label: "♊️ Близнецы" },
    ZodiacSign { code: "cancer", label: "♋️ Рак" },
    ZodiacSign { code: "leo", label: "♌️ Лев" },
    ZodiacSign { code: "virgo", label: "♍️ Дева" },
    ZodiacSign { code: "libra", label: "♎️ Весы" },
    ZodiacSign { code: "scorpio", label: "♏️ Скорпион" },
    ZodiacSign { code: "sagittarius", label: "♐️ Стрелец" },
    ZodiacSign { code: "capricorn", label: "♑️ Козерог" },
    ZodiacSign { code: "aquarius", label: "♒️ Водолей" },
    ZodiacSign { code: "pisces", label: "♓️ Рыбы" },
];

impl ZodiacSign {
    pub fn find_by_code(code: &str) -> Option<ZodiacSign> {
        ZODIAC_SIGNS.iter().copied().find(|sign| sign.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_twelve_unique_codes() {
        assert_eq!(ZODIAC_SIGNS.len(), 12);
        for (i, a) in ZODIAC_SIGNS.iter().enumerate() {
            for b in &ZODIAC_SIGNS[i + 1..] {
                assert_ne!(a.code, b.code);
            }
        }
    }

    #[test]
    fn finds_sign_by_code() {
        assert_eq!(ZodiacSign::find_by_code("aries").map(|s| s.label), Some("♈️ Овен"));
        assert_eq!(ZodiacSign::find_by_code("pisces").map(|s| s.label), Some("♓️ Рыбы"));
    }

    #[test]
    fn rejects_unknown_code() {
        assert_eq!(ZodiacSign::find_by_code("ophiuchus"), None);
        assert_eq!(ZodiacSign::find_by_code(""), None);
        assert_eq!(ZodiacSign::find_by_code("Aries"), None);
    }
}
