//! RDF vocabulary used by the login data model.

pub const MU: &str = "http://mu.semte.ch/vocabularies/core/";
pub const SESSION: &str = "http://mu.semte.ch/vocabularies/session/";
pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";
pub const DCTERMS: &str = "http://purl.org/dc/terms/";
pub const ADMS: &str = "http://www.w3.org/ns/adms#";
pub const SKOS: &str = "http://www.w3.org/2004/02/skos/core#";
pub const BESLUIT: &str = "http://data.vlaanderen.be/ns/besluit#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

// Classes
pub const FOAF_PERSON: &str = "http://xmlns.com/foaf/0.1/Person";
pub const FOAF_ONLINE_ACCOUNT: &str = "http://xmlns.com/foaf/0.1/OnlineAccount";
pub const ADMS_IDENTIFIER_CLASS: &str = "http://www.w3.org/ns/adms#Identifier";
pub const BESTUURSEENHEID: &str = "http://data.vlaanderen.be/ns/besluit#Bestuurseenheid";

// Properties
pub const MU_UUID: &str = "http://mu.semte.ch/vocabularies/core/uuid";
pub const SESSION_ACCOUNT: &str = "http://mu.semte.ch/vocabularies/session/account";
pub const SESSION_GROUP: &str = "http://mu.semte.ch/vocabularies/session/group";
pub const FOAF_FIRST_NAME: &str = "http://xmlns.com/foaf/0.1/firstName";
pub const FOAF_FAMILY_NAME: &str = "http://xmlns.com/foaf/0.1/familyName";
pub const FOAF_ACCOUNT: &str = "http://xmlns.com/foaf/0.1/account";
pub const FOAF_ACCOUNT_SERVICE_HOMEPAGE: &str = "http://xmlns.com/foaf/0.1/accountServiceHomepage";
pub const ADMS_IDENTIFIER: &str = "http://www.w3.org/ns/adms#identifier";
pub const SKOS_NOTATION: &str = "http://www.w3.org/2004/02/skos/core#notation";
pub const DCTERMS_IDENTIFIER: &str = "http://purl.org/dc/terms/identifier";
pub const DCTERMS_CREATED: &str = "http://purl.org/dc/terms/created";
pub const DCTERMS_MODIFIED: &str = "http://purl.org/dc/terms/modified";

pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

/// Prefix declarations, as `(prefix, namespace)` pairs.
pub const PREFIXES: [(&str, &str); 8] = [
    ("mu", MU),
    ("session", SESSION),
    ("foaf", FOAF),
    ("dcterms", DCTERMS),
    ("adms", ADMS),
    ("skos", SKOS),
    ("besluit", BESLUIT),
    ("xsd", XSD),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_live_in_their_namespace() {
        for (term, ns) in [
            (MU_UUID, MU),
            (SESSION_ACCOUNT, SESSION),
            (SESSION_GROUP, SESSION),
            (FOAF_PERSON, FOAF),
            (FOAF_ACCOUNT_SERVICE_HOMEPAGE, FOAF),
            (ADMS_IDENTIFIER_CLASS, ADMS),
            (SKOS_NOTATION, SKOS),
            (DCTERMS_MODIFIED, DCTERMS),
            (BESTUURSEENHEID, BESLUIT),
            (XSD_DATE_TIME, XSD),
            (RDF_TYPE, RDF),
        ] {
            assert!(term.starts_with(ns), "{term} not in {ns}");
        }
    }
}
