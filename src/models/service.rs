use serde::Serialize;

/// Услуга барбершопа. Статический каталог: читается из кода,
/// в рантайме не меняется.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Service {
    pub key: &'static str,
    pub name: &'static str,
    pub price: u32,
    pub duration_min: u32,
    pub emoji: &'static str,
}

pub const SERVICES: &[Service] = &[
    Service {
        key: "haircut",
        name: "Мужская стрижка",
        price: 1500,
        duration_min: 60,
        emoji: "✂️",
    },
    Service {
        key: "beard",
        name: "Моделирование бороды",
        price: 800,
        duration_min: 30,
        emoji: "🧔",
    },
    Service {
        key: "combo",
        name: "Стрижка + борода",
        price: 2000,
        duration_min: 90,
        emoji: "💈",
    },
    Service {
        key: "kids",
        name: "Детская стрижка",
        price: 1000,
        duration_min: 45,
        emoji: "👦",
    },
];

impl Service {
    pub fn find(key: &str) -> Option<&'static Service> {
        SERVICES.iter().find(|s| s.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_known_service() {
        let service = Service::find("haircut").unwrap();
        assert_eq!(service.name, "Мужская стрижка");
        assert_eq!(service.price, 1500);
    }

    #[test]
    fn find_unknown_service() {
        assert!(Service::find("manicure").is_none());
        assert!(Service::find("").is_none());
    }

    #[test]
    fn catalog_keys_are_unique() {
        for (i, a) in SERVICES.iter().enumerate() {
            for b in &SERVICES[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }
}
