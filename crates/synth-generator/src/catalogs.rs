//! Value catalogs: static pools of locale-plausible atomic values.
//!
//! Everything here is Irish-locale reference data loaded once into
//! immutable statics, with deterministic draw functions that take the
//! caller's RNG. Catalogs never change during a batch; the cross-field
//! rules (a county implies its valid town set) live in the draw functions.

use rand::seq::IndexedRandom;
use rand::Rng;

pub const HOSPITALS: &[&str] = &[
    "St James's Hospital",
    "Beaumont Hospital",
    "Mater Misericordiae University Hospital",
    "St Vincent's University Hospital",
    "Tallaght University Hospital",
    "Cork University Hospital",
    "University Hospital Galway",
    "University Hospital Limerick",
    "University Hospital Waterford",
    "Sligo University Hospital",
    "Our Lady of Lourdes Hospital",
    "Connolly Hospital Blanchardstown",
    "St Luke's General Hospital Kilkenny",
    "Wexford General Hospital",
    "Letterkenny University Hospital",
    "Mayo University Hospital",
    "Portiuncula University Hospital",
    "Cavan General Hospital",
    "Mercy University Hospital Cork",
];

pub const COUNTIES: &[&str] = &[
    "CARLOW", "CAVAN", "CLARE", "CORK", "DONEGAL", "DUBLIN", "GALWAY", "KERRY", "KILDARE",
    "KILKENNY", "LAOIS", "LEITRIM", "LIMERICK", "LONGFORD", "LOUTH", "MAYO", "MEATH", "MONAGHAN",
    "OFFALY", "ROSCOMMON", "SLIGO", "TIPPERARY", "WATERFORD", "WESTMEATH", "WEXFORD", "WICKLOW",
];

/// Towns belonging to a county. A region implies its valid town set.
pub fn towns_in_county(county: &str) -> &'static [&'static str] {
    match county {
        "CARLOW" => &["Carlow", "Tullow", "Bagenalstown"],
        "CAVAN" => &["Cavan", "Bailieborough", "Virginia"],
        "CLARE" => &["Ennis", "Shannon", "Kilrush"],
        "CORK" => &["Cork", "Mallow", "Midleton", "Bandon", "Clonakilty", "Youghal"],
        "DONEGAL" => &["Letterkenny", "Buncrana", "Donegal", "Ballybofey"],
        "DUBLIN" => &["Dublin", "Swords", "Tallaght", "Clondalkin", "Dún Laoghaire", "Blanchardstown"],
        "GALWAY" => &["Galway", "Tuam", "Loughrea", "Ballinasloe", "Oranmore"],
        "KERRY" => &["Tralee", "Killarney", "Dingle", "Listowel"],
        "KILDARE" => &["Naas", "Newbridge", "Maynooth", "Kildare"],
        "KILKENNY" => &["Kilkenny", "Thomastown", "Castlecomer"],
        "LAOIS" => &["Portlaoise", "Portarlington", "Mountmellick"],
        "LEITRIM" => &["Carrick-on-Shannon", "Manorhamilton", "Ballinamore"],
        "LIMERICK" => &["Limerick", "Newcastle West", "Kilmallock", "Adare"],
        "LONGFORD" => &["Longford", "Granard", "Edgeworthstown"],
        "LOUTH" => &["Dundalk", "Drogheda", "Ardee"],
        "MAYO" => &["Castlebar", "Ballina", "Westport"],
        "MEATH" => &["Navan", "Trim", "Kells", "Ashbourne"],
        "MONAGHAN" => &["Monaghan", "Carrickmacross", "Castleblayney"],
        "OFFALY" => &["Tullamore", "Birr", "Edenderry"],
        "ROSCOMMON" => &["Roscommon", "Boyle", "Castlerea"],
        "SLIGO" => &["Sligo", "Tubbercurry", "Ballymote"],
        "TIPPERARY" => &["Nenagh", "Thurles", "Clonmel", "Tipperary"],
        "WATERFORD" => &["Waterford", "Dungarvan", "Tramore"],
        "WESTMEATH" => &["Mullingar", "Athlone", "Moate"],
        "WEXFORD" => &["Wexford", "Gorey", "Enniscorthy", "New Ross"],
        "WICKLOW" => &["Wicklow", "Bray", "Greystones", "Arklow"],
        _ => &["Dublin"],
    }
}

/// Eircode routing keys in active use.
const EIRCODE_ROUTING_KEYS: &[&str] = &[
    "D01", "D02", "D03", "D04", "D05", "D06", "D07", "D08", "D09", "D10", "D11", "D12", "D13",
    "D14", "D15", "D16", "D17", "D18", "D20", "D22", "D24", "T12", "T23", "T34", "T45", "T56",
    "H91", "V94", "V92", "F92", "F91", "A94", "A96", "K67", "R95", "X91", "V42", "V31", "P85",
    "N37", "Y35",
];

/// Eircode unique-identifier alphabet (no I or O).
const EIRCODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ0123456789";

pub const MALE_GIVEN_NAMES: &[&str] = &[
    "Sean", "Conor", "Jack", "Liam", "Cian", "Oisin", "Darragh", "Fionn", "Cathal", "Eoin",
    "Padraig", "Tadhg", "Niall", "Ronan", "Cormac", "Declan", "Brendan", "Colm", "Shane", "Kevin",
    "Aidan", "Fergal", "Diarmuid", "Lorcan", "Donal",
];

pub const FEMALE_GIVEN_NAMES: &[&str] = &[
    "Aoife", "Saoirse", "Niamh", "Ciara", "Roisin", "Sinead", "Orla", "Grainne", "Clodagh",
    "Aisling", "Maeve", "Fiona", "Eimear", "Siobhan", "Deirdre", "Laoise", "Caoimhe", "Brid",
    "Una", "Nuala", "Emer", "Sorcha", "Dearbhla", "Mairead", "Cliona",
];

pub const SURNAMES: &[&str] = &[
    "Murphy", "Kelly", "O'Sullivan", "Walsh", "Smith", "O'Brien", "Byrne", "Ryan", "O'Connor",
    "O'Neill", "O'Reilly", "Doyle", "McCarthy", "Gallagher", "Doherty", "Kennedy", "Lynch",
    "Murray", "Quinn", "Moore", "McLoughlin", "Carroll", "Connolly", "Daly", "Connell", "Wilson",
    "Dunne", "Brennan", "Burke", "Collins",
];

pub const STREET_NAMES: &[&str] = &[
    "Main Street", "Church Road", "Castle Street", "Mill Lane", "Harbour View", "The Green",
    "Abbey Road", "Station Road", "Bridge Street", "Market Square", "College Green", "Oak Drive",
    "Willow Park", "Riverside Drive", "Chapel Lane", "High Street", "Strand Road", "Ashfield Grove",
    "Beechwood Avenue", "Glendale Park",
];

pub const DOCTOR_PREFIXES: &[&str] = &["DR", "PROF", "MR", "MS"];

pub const DISCHARGE_DISPOSITIONS: &[&str] = &["01", "02", "03", "04"];

/// Draw one entry from a static pool.
///
/// Pools are non-empty by construction, so this never fails.
pub fn pick<R: Rng + ?Sized>(rng: &mut R, pool: &'static [&'static str]) -> &'static str {
    pool.choose(rng).copied().unwrap_or(pool[0])
}

/// Draw a county and a town consistent with it.
pub fn county_and_town<R: Rng + ?Sized>(rng: &mut R) -> (&'static str, &'static str) {
    let county = pick(rng, COUNTIES);
    let town = pick(rng, towns_in_county(county));
    (county, town)
}

/// Generate an Eircode: routing key, space, four characters from the
/// Eircode alphabet.
pub fn eircode<R: Rng + ?Sized>(rng: &mut R) -> String {
    let key = pick(rng, EIRCODE_ROUTING_KEYS);
    let mut tail = String::with_capacity(4);
    for _ in 0..4 {
        let i = rng.random_range(0..EIRCODE_ALPHABET.len());
        tail.push(EIRCODE_ALPHABET[i] as char);
    }
    format!("{key} {tail}")
}

/// Generate an Irish phone number: mostly mobile, some Dublin landline,
/// some regional landline.
pub fn phone_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    let split: f64 = rng.random();
    if split < 0.70 {
        let prefix = pick(rng, &["83", "85", "86", "87", "89"]);
        format!("+353 {} {}", prefix, rng.random_range(1_000_000..10_000_000u32))
    } else if split < 0.85 {
        format!("+353 1 {}", rng.random_range(1_000_000..10_000_000u32))
    } else {
        let area = pick(rng, &["21", "51", "61", "91", "65", "74"]);
        format!("+353 {} {}", area, rng.random_range(100_000..1_000_000u32))
    }
}

/// Generate an uppercased street address line: house number plus street.
pub fn address_line<R: Rng + ?Sized>(rng: &mut R) -> String {
    let house = rng.random_range(1..=250);
    let street = pick(rng, STREET_NAMES);
    format!("{house} {street}").to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_town_belongs_to_county() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let (county, town) = county_and_town(&mut rng);
            assert!(towns_in_county(county).contains(&town));
        }
    }

    #[test]
    fn test_eircode_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let code = eircode(&mut rng);
            assert_eq!(code.len(), 8);
            assert_eq!(code.as_bytes()[3], b' ');
            assert!(code
                .chars()
                .filter(|c| *c != ' ')
                .all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_phone_prefix() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            assert!(phone_number(&mut rng).starts_with("+353 "));
        }
    }

    #[test]
    fn test_deterministic_draws() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(eircode(&mut a), eircode(&mut b));
        assert_eq!(phone_number(&mut a), phone_number(&mut b));
        assert_eq!(address_line(&mut a), address_line(&mut b));
    }
}
