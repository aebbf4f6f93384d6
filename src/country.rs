//! ISO 3166-1 country names and a fuzzy lookup over them.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    pub alpha_2: &'static str,
    pub alpha_3: &'static str,
    pub name: &'static str,
    pub official_name: Option<&'static str>,
    pub common_name: Option<&'static str>,
}

impl Country {
    fn names(&self) -> impl Iterator<Item = &'static str> {
        [Some(self.name), self.official_name, self.common_name]
            .into_iter()
            .flatten()
    }
}

const fn c(alpha_2: &'static str, alpha_3: &'static str, name: &'static str) -> Country {
    Country {
        alpha_2,
        alpha_3,
        name,
        official_name: None,
        common_name: None,
    }
}

const fn o(
    alpha_2: &'static str,
    alpha_3: &'static str,
    name: &'static str,
    official_name: &'static str,
) -> Country {
    Country {
        alpha_2,
        alpha_3,
        name,
        official_name: Some(official_name),
        common_name: None,
    }
}

const fn oc(
    alpha_2: &'static str,
    alpha_3: &'static str,
    name: &'static str,
    official_name: &'static str,
    common_name: &'static str,
) -> Country {
    Country {
        alpha_2,
        alpha_3,
        name,
        official_name: Some(official_name),
        common_name: Some(common_name),
    }
}

pub static COUNTRIES: &[Country] = &[
    c("AW", "ABW", "Aruba"),
    o("AF", "AFG", "Afghanistan", "Islamic Republic of Afghanistan"),
    o("AO", "AGO", "Angola", "Republic of Angola"),
    c("AI", "AIA", "Anguilla"),
    c("AX", "ALA", "Åland Islands"),
    o("AL", "ALB", "Albania", "Republic of Albania"),
    o("AD", "AND", "Andorra", "Principality of Andorra"),
    c("AE", "ARE", "United Arab Emirates"),
    o("AR", "ARG", "Argentina", "Argentine Republic"),
    o("AM", "ARM", "Armenia", "Republic of Armenia"),
    c("AS", "ASM", "American Samoa"),
    c("AQ", "ATA", "Antarctica"),
    c("TF", "ATF", "French Southern Territories"),
    c("AG", "ATG", "Antigua and Barbuda"),
    c("AU", "AUS", "Australia"),
    o("AT", "AUT", "Austria", "Republic of Austria"),
    o("AZ", "AZE", "Azerbaijan", "Republic of Azerbaijan"),
    o("BI", "BDI", "Burundi", "Republic of Burundi"),
    o("BE", "BEL", "Belgium", "Kingdom of Belgium"),
    o("BJ", "BEN", "Benin", "Republic of Benin"),
    c("BQ", "BES", "Bonaire, Sint Eustatius and Saba"),
    c("BF", "BFA", "Burkina Faso"),
    o("BD", "BGD", "Bangladesh", "People's Republic of Bangladesh"),
    o("BG", "BGR", "Bulgaria", "Republic of Bulgaria"),
    o("BH", "BHR", "Bahrain", "Kingdom of Bahrain"),
    o("BS", "BHS", "Bahamas", "Commonwealth of the Bahamas"),
    o("BA", "BIH", "Bosnia and Herzegovina", "Republic of Bosnia and Herzegovina"),
    c("BL", "BLM", "Saint Barthélemy"),
    o("BY", "BLR", "Belarus", "Republic of Belarus"),
    c("BZ", "BLZ", "Belize"),
    c("BM", "BMU", "Bermuda"),
    oc(
        "BO",
        "BOL",
        "Bolivia, Plurinational State of",
        "Plurinational State of Bolivia",
        "Bolivia",
    ),
    o("BR", "BRA", "Brazil", "Federative Republic of Brazil"),
    c("BB", "BRB", "Barbados"),
    c("BN", "BRN", "Brunei Darussalam"),
    o("BT", "BTN", "Bhutan", "Kingdom of Bhutan"),
    c("BV", "BVT", "Bouvet Island"),
    o("BW", "BWA", "Botswana", "Republic of Botswana"),
    c("CF", "CAF", "Central African Republic"),
    c("CA", "CAN", "Canada"),
    c("CC", "CCK", "Cocos (Keeling) Islands"),
    o("CH", "CHE", "Switzerland", "Swiss Confederation"),
    o("CL", "CHL", "Chile", "Republic of Chile"),
    o("CN", "CHN", "China", "People's Republic of China"),
    o("CI", "CIV", "Côte d'Ivoire", "Republic of Côte d'Ivoire"),
    o("CM", "CMR", "Cameroon", "Republic of Cameroon"),
    c("CD", "COD", "Congo, The Democratic Republic of the"),
    o("CG", "COG", "Congo", "Republic of the Congo"),
    c("CK", "COK", "Cook Islands"),
    o("CO", "COL", "Colombia", "Republic of Colombia"),
    o("KM", "COM", "Comoros", "Union of the Comoros"),
    o("CV", "CPV", "Cabo Verde", "Republic of Cabo Verde"),
    o("CR", "CRI", "Costa Rica", "Republic of Costa Rica"),
    o("CU", "CUB", "Cuba", "Republic of Cuba"),
    c("CW", "CUW", "Curaçao"),
    c("CX", "CXR", "Christmas Island"),
    c("KY", "CYM", "Cayman Islands"),
    o("CY", "CYP", "Cyprus", "Republic of Cyprus"),
    c("CZ", "CZE", "Czechia"),
    o("DE", "DEU", "Germany", "Federal Republic of Germany"),
    o("DJ", "DJI", "Djibouti", "Republic of Djibouti"),
    c("DM", "DMA", "Dominica"),
    o("DK", "DNK", "Denmark", "Kingdom of Denmark"),
    c("DO", "DOM", "Dominican Republic"),
    o("DZ", "DZA", "Algeria", "People's Democratic Republic of Algeria"),
    o("EC", "ECU", "Ecuador", "Republic of Ecuador"),
    o("EG", "EGY", "Egypt", "Arab Republic of Egypt"),
    c("ER", "ERI", "Eritrea"),
    c("EH", "ESH", "Western Sahara"),
    o("ES", "ESP", "Spain", "Kingdom of Spain"),
    o("EE", "EST", "Estonia", "Republic of Estonia"),
    o("ET", "ETH", "Ethiopia", "Federal Democratic Republic of Ethiopia"),
    o("FI", "FIN", "Finland", "Republic of Finland"),
    o("FJ", "FJI", "Fiji", "Republic of Fiji"),
    c("FK", "FLK", "Falkland Islands (Malvinas)"),
    o("FR", "FRA", "France", "French Republic"),
    c("FO", "FRO", "Faroe Islands"),
    o("FM", "FSM", "Micronesia, Federated States of", "Federated States of Micronesia"),
    o("GA", "GAB", "Gabon", "Gabonese Republic"),
    o("GB", "GBR", "United Kingdom", "United Kingdom of Great Britain and Northern Ireland"),
    c("GE", "GEO", "Georgia"),
    c("GG", "GGY", "Guernsey"),
    o("GH", "GHA", "Ghana", "Republic of Ghana"),
    c("GI", "GIB", "Gibraltar"),
    o("GN", "GIN", "Guinea", "Republic of Guinea"),
    c("GP", "GLP", "Guadeloupe"),
    o("GM", "GMB", "Gambia", "Republic of the Gambia"),
    o("GW", "GNB", "Guinea-Bissau", "Republic of Guinea-Bissau"),
    o("GQ", "GNQ", "Equatorial Guinea", "Republic of Equatorial Guinea"),
    o("GR", "GRC", "Greece", "Hellenic Republic"),
    c("GD", "GRD", "Grenada"),
    c("GL", "GRL", "Greenland"),
    o("GT", "GTM", "Guatemala", "Republic of Guatemala"),
    c("GF", "GUF", "French Guiana"),
    c("GU", "GUM", "Guam"),
    o("GY", "GUY", "Guyana", "Republic of Guyana"),
    o(
        "HK",
        "HKG",
        "Hong Kong",
        "Hong Kong Special Administrative Region of China",
    ),
    c("HM", "HMD", "Heard Island and McDonald Islands"),
    o("HN", "HND", "Honduras", "Republic of Honduras"),
    o("HR", "HRV", "Croatia", "Republic of Croatia"),
    o("HT", "HTI", "Haiti", "Republic of Haiti"),
    o("HU", "HUN", "Hungary", "Hungary"),
    o("ID", "IDN", "Indonesia", "Republic of Indonesia"),
    c("IM", "IMN", "Isle of Man"),
    o("IN", "IND", "India", "Republic of India"),
    c("IO", "IOT", "British Indian Ocean Territory"),
    c("IE", "IRL", "Ireland"),
    oc(
        "IR",
        "IRN",
        "Iran, Islamic Republic of",
        "Islamic Republic of Iran",
        "Iran",
    ),
    o("IQ", "IRQ", "Iraq", "Republic of Iraq"),
    o("IS", "ISL", "Iceland", "Republic of Iceland"),
    o("IL", "ISR", "Israel", "State of Israel"),
    o("IT", "ITA", "Italy", "Italian Republic"),
    c("JM", "JAM", "Jamaica"),
    c("JE", "JEY", "Jersey"),
    o("JO", "JOR", "Jordan", "Hashemite Kingdom of Jordan"),
    c("JP", "JPN", "Japan"),
    o("KZ", "KAZ", "Kazakhstan", "Republic of Kazakhstan"),
    o("KE", "KEN", "Kenya", "Republic of Kenya"),
    o("KG", "KGZ", "Kyrgyzstan", "Kyrgyz Republic"),
    o("KH", "KHM", "Cambodia", "Kingdom of Cambodia"),
    o("KI", "KIR", "Kiribati", "Republic of Kiribati"),
    c("KN", "KNA", "Saint Kitts and Nevis"),
    oc(
        "KR",
        "KOR",
        "Korea, Republic of",
        "Republic of Korea",
        "South Korea",
    ),
    o("KW", "KWT", "Kuwait", "State of Kuwait"),
    oc(
        "LA",
        "LAO",
        "Lao People's Democratic Republic",
        "Lao People's Democratic Republic",
        "Laos",
    ),
    o("LB", "LBN", "Lebanon", "Lebanese Republic"),
    o("LR", "LBR", "Liberia", "Republic of Liberia"),
    o("LY", "LBY", "Libya", "Libya"),
    c("LC", "LCA", "Saint Lucia"),
    o("LI", "LIE", "Liechtenstein", "Principality of Liechtenstein"),
    o("LK", "LKA", "Sri Lanka", "Democratic Socialist Republic of Sri Lanka"),
    o("LS", "LSO", "Lesotho", "Kingdom of Lesotho"),
    o("LT", "LTU", "Lithuania", "Republic of Lithuania"),
    o("LU", "LUX", "Luxembourg", "Grand Duchy of Luxembourg"),
    o("LV", "LVA", "Latvia", "Republic of Latvia"),
    o(
        "MO",
        "MAC",
        "Macao",
        "Macao Special Administrative Region of China",
    ),
    c("MF", "MAF", "Saint Martin (French part)"),
    o("MA", "MAR", "Morocco", "Kingdom of Morocco"),
    o("MC", "MCO", "Monaco", "Principality of Monaco"),
    oc(
        "MD",
        "MDA",
        "Moldova, Republic of",
        "Republic of Moldova",
        "Moldova",
    ),
    o("MG", "MDG", "Madagascar", "Republic of Madagascar"),
    o("MV", "MDV", "Maldives", "Republic of Maldives"),
    o("MX", "MEX", "Mexico", "United Mexican States"),
    o("MH", "MHL", "Marshall Islands", "Republic of the Marshall Islands"),
    o("MK", "MKD", "North Macedonia", "Republic of North Macedonia"),
    o("ML", "MLI", "Mali", "Republic of Mali"),
    o("MT", "MLT", "Malta", "Republic of Malta"),
    o("MM", "MMR", "Myanmar", "Republic of Myanmar"),
    c("ME", "MNE", "Montenegro"),
    c("MN", "MNG", "Mongolia"),
    o("MP", "MNP", "Northern Mariana Islands", "Commonwealth of the Northern Mariana Islands"),
    o("MZ", "MOZ", "Mozambique", "Republic of Mozambique"),
    o("MR", "MRT", "Mauritania", "Islamic Republic of Mauritania"),
    c("MS", "MSR", "Montserrat"),
    c("MQ", "MTQ", "Martinique"),
    o("MU", "MUS", "Mauritius", "Republic of Mauritius"),
    o("MW", "MWI", "Malawi", "Republic of Malawi"),
    c("MY", "MYS", "Malaysia"),
    c("YT", "MYT", "Mayotte"),
    o("NA", "NAM", "Namibia", "Republic of Namibia"),
    c("NC", "NCL", "New Caledonia"),
    o("NE", "NER", "Niger", "Republic of the Niger"),
    c("NF", "NFK", "Norfolk Island"),
    o("NG", "NGA", "Nigeria", "Federal Republic of Nigeria"),
    o("NI", "NIC", "Nicaragua", "Republic of Nicaragua"),
    c("NU", "NIU", "Niue"),
    o("NL", "NLD", "Netherlands", "Kingdom of the Netherlands"),
    o("NO", "NOR", "Norway", "Kingdom of Norway"),
    o("NP", "NPL", "Nepal", "Federal Democratic Republic of Nepal"),
    o("NR", "NRU", "Nauru", "Republic of Nauru"),
    c("NZ", "NZL", "New Zealand"),
    o("OM", "OMN", "Oman", "Sultanate of Oman"),
    o("PK", "PAK", "Pakistan", "Islamic Republic of Pakistan"),
    o("PA", "PAN", "Panama", "Republic of Panama"),
    c("PN", "PCN", "Pitcairn"),
    o("PE", "PER", "Peru", "Republic of Peru"),
    o("PH", "PHL", "Philippines", "Republic of the Philippines"),
    o("PW", "PLW", "Palau", "Republic of Palau"),
    o("PG", "PNG", "Papua New Guinea", "Independent State of Papua New Guinea"),
    o("PL", "POL", "Poland", "Republic of Poland"),
    c("PR", "PRI", "Puerto Rico"),
    oc(
        "KP",
        "PRK",
        "Korea, Democratic People's Republic of",
        "Democratic People's Republic of Korea",
        "North Korea",
    ),
    o("PT", "PRT", "Portugal", "Portuguese Republic"),
    o("PY", "PRY", "Paraguay", "Republic of Paraguay"),
    o("PS", "PSE", "Palestine, State of", "the State of Palestine"),
    c("PF", "PYF", "French Polynesia"),
    o("QA", "QAT", "Qatar", "State of Qatar"),
    c("RE", "REU", "Réunion"),
    c("RO", "ROU", "Romania"),
    c("RU", "RUS", "Russian Federation"),
    o("RW", "RWA", "Rwanda", "Rwandese Republic"),
    o("SA", "SAU", "Saudi Arabia", "Kingdom of Saudi Arabia"),
    o("SD", "SDN", "Sudan", "Republic of the Sudan"),
    o("SN", "SEN", "Senegal", "Republic of Senegal"),
    o("SG", "SGP", "Singapore", "Republic of Singapore"),
    c("GS", "SGS", "South Georgia and the South Sandwich Islands"),
    c("SH", "SHN", "Saint Helena, Ascension and Tristan da Cunha"),
    c("SJ", "SJM", "Svalbard and Jan Mayen"),
    c("SB", "SLB", "Solomon Islands"),
    o("SL", "SLE", "Sierra Leone", "Republic of Sierra Leone"),
    o("SV", "SLV", "El Salvador", "Republic of El Salvador"),
    o("SM", "SMR", "San Marino", "Republic of San Marino"),
    o("SO", "SOM", "Somalia", "Federal Republic of Somalia"),
    c("PM", "SPM", "Saint Pierre and Miquelon"),
    o("RS", "SRB", "Serbia", "Republic of Serbia"),
    o("SS", "SSD", "South Sudan", "Republic of South Sudan"),
    o(
        "ST",
        "STP",
        "Sao Tome and Principe",
        "Democratic Republic of Sao Tome and Principe",
    ),
    o("SR", "SUR", "Suriname", "Republic of Suriname"),
    o("SK", "SVK", "Slovakia", "Slovak Republic"),
    o("SI", "SVN", "Slovenia", "Republic of Slovenia"),
    o("SE", "SWE", "Sweden", "Kingdom of Sweden"),
    o("SZ", "SWZ", "Eswatini", "Kingdom of Eswatini"),
    c("SX", "SXM", "Sint Maarten (Dutch part)"),
    o("SC", "SYC", "Seychelles", "Republic of Seychelles"),
    oc(
        "SY",
        "SYR",
        "Syrian Arab Republic",
        "Syrian Arab Republic",
        "Syria",
    ),
    c("TC", "TCA", "Turks and Caicos Islands"),
    o("TD", "TCD", "Chad", "Republic of Chad"),
    o("TG", "TGO", "Togo", "Togolese Republic"),
    o("TH", "THA", "Thailand", "Kingdom of Thailand"),
    o("TJ", "TJK", "Tajikistan", "Republic of Tajikistan"),
    c("TK", "TKL", "Tokelau"),
    c("TM", "TKM", "Turkmenistan"),
    o("TL", "TLS", "Timor-Leste", "Democratic Republic of Timor-Leste"),
    o("TO", "TON", "Tonga", "Kingdom of Tonga"),
    o("TT", "TTO", "Trinidad and Tobago", "Republic of Trinidad and Tobago"),
    o("TN", "TUN", "Tunisia", "Republic of Tunisia"),
    o("TR", "TUR", "Türkiye", "Republic of Türkiye"),
    c("TV", "TUV", "Tuvalu"),
    oc(
        "TW",
        "TWN",
        "Taiwan, Province of China",
        "Taiwan, Province of China",
        "Taiwan",
    ),
    oc(
        "TZ",
        "TZA",
        "Tanzania, United Republic of",
        "United Republic of Tanzania",
        "Tanzania",
    ),
    o("UG", "UGA", "Uganda", "Republic of Uganda"),
    c("UA", "UKR", "Ukraine"),
    c("UM", "UMI", "United States Minor Outlying Islands"),
    o("UY", "URY", "Uruguay", "Eastern Republic of Uruguay"),
    o("US", "USA", "United States", "United States of America"),
    o("UZ", "UZB", "Uzbekistan", "Republic of Uzbekistan"),
    c("VA", "VAT", "Holy See (Vatican City State)"),
    c("VC", "VCT", "Saint Vincent and the Grenadines"),
    oc(
        "VE",
        "VEN",
        "Venezuela, Bolivarian Republic of",
        "Bolivarian Republic of Venezuela",
        "Venezuela",
    ),
    o("VG", "VGB", "Virgin Islands, British", "British Virgin Islands"),
    o("VI", "VIR", "Virgin Islands, U.S.", "Virgin Islands of the United States"),
    oc(
        "VN",
        "VNM",
        "Viet Nam",
        "Socialist Republic of Viet Nam",
        "Vietnam",
    ),
    o("VU", "VUT", "Vanuatu", "Republic of Vanuatu"),
    c("WF", "WLF", "Wallis and Futuna"),
    o("WS", "WSM", "Samoa", "Independent State of Samoa"),
    o("YE", "YEM", "Yemen", "Republic of Yemen"),
    o("ZA", "ZAF", "South Africa", "Republic of South Africa"),
    o("ZM", "ZMB", "Zambia", "Republic of Zambia"),
    o("ZW", "ZWE", "Zimbabwe", "Republic of Zimbabwe"),
];

/// Resolves free text to a country.
///
/// An exact, case- and accent-insensitive match on a name or code wins.
/// Otherwise every country whose name contains the query scores
/// `max(5, 30 - 2 * position)` and the best score is returned, ties broken by
/// alpha-2 code.
#[must_use]
pub fn search_fuzzy(query: &str) -> Option<&'static Country> {
    let query = fold(query.trim());
    if query.is_empty() {
        return None;
    }

    if let Some(country) = lookup(&query) {
        return Some(country);
    }

    COUNTRIES
        .iter()
        .filter_map(|country| {
            country
                .names()
                .map(fold)
                .find_map(|name| name.find(&query))
                .map(|position| (country, partial_score(position)))
        })
        .max_by(|(left, left_score), (right, right_score)| {
            left_score
                .cmp(right_score)
                .then_with(|| right.alpha_2.cmp(left.alpha_2))
        })
        .map(|(country, _)| country)
}

fn lookup(folded_query: &str) -> Option<&'static Country> {
    COUNTRIES.iter().find(|country| {
        country.alpha_2.eq_ignore_ascii_case(folded_query)
            || country.alpha_3.eq_ignore_ascii_case(folded_query)
            || country.names().any(|name| fold(name) == folded_query)
    })
}

fn partial_score(byte_position: usize) -> usize {
    30_usize.saturating_sub(2 * byte_position).max(5)
}

/// Lowercases and strips the Latin diacritics that occur in country names.
fn fold(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(|ch| match ch {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'ç' => 'c',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ñ' => 'n',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ý' | 'ÿ' => 'y',
            _ => ch,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{COUNTRIES, search_fuzzy};

    fn name_of(query: &str) -> Option<&'static str> {
        search_fuzzy(query).map(|country| country.name)
    }

    #[test]
    fn exact_names_and_codes_resolve() {
        assert_eq!(name_of("Chad"), Some("Chad"));
        assert_eq!(name_of("chad"), Some("Chad"));
        assert_eq!(name_of("TCD"), Some("Chad"));
        assert_eq!(name_of("Bosnia and Herzegovina"), Some("Bosnia and Herzegovina"));
    }

    #[test]
    fn common_and_accented_names_resolve() {
        assert_eq!(name_of("Bolivia"), Some("Bolivia, Plurinational State of"));
        assert_eq!(name_of("Cote d'Ivoire"), Some("Côte d'Ivoire"));
        assert_eq!(name_of("reunion"), Some("Réunion"));
    }

    #[test]
    fn partial_match_prefers_early_position() {
        assert_eq!(name_of("Bosnia"), Some("Bosnia and Herzegovina"));
        assert_eq!(name_of("Herzegovina"), Some("Bosnia and Herzegovina"));
    }

    #[test]
    fn unknown_text_does_not_resolve() {
        assert_eq!(name_of("Atlantis"), None);
        assert_eq!(name_of("   "), None);
    }

    #[test]
    fn codes_are_unique() {
        let mut codes = COUNTRIES.iter().map(|country| country.alpha_2).collect::<Vec<_>>();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), COUNTRIES.len());
    }
}
