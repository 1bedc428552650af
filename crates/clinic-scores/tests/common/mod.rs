#![allow(dead_code)]

use clinic_scores::scoring::{EnrichmentRecord, EstablishmentId, Platform, ReviewId, ReviewSignal};
use clinic_scores::store::{EstablishmentDocument, StoreSnapshot};

pub fn establishment(id: &str, display_name: &str) -> EstablishmentDocument {
    EstablishmentDocument {
        id: EstablishmentId(id.to_string()),
        display_name: Some(display_name.to_string()),
        ..EstablishmentDocument::default()
    }
}

pub fn review(id: &str, establishment: &str, rating: f64) -> ReviewSignal {
    ReviewSignal {
        id: ReviewId(id.to_string()),
        establishment_id: EstablishmentId(establishment.to_string()),
        platform: Platform::Google,
        rating: Some(rating),
        is_local_guide: None,
        verification_level: None,
    }
}

pub fn enrichment(id: &str) -> EnrichmentRecord {
    EnrichmentRecord {
        id: ReviewId(id.to_string()),
        ..EnrichmentRecord::default()
    }
}

/// Alpha has enriched reviews, Beta only star ratings, Gamma nothing.
pub fn clinic_snapshot() -> StoreSnapshot {
    let mut praise = enrichment("r-1");
    praise.is_complaint = Some(0);
    praise.facility = Some(3);
    praise.affordability = Some(3);
    praise.recommendation = Some(3);

    let mut handled_complaint = enrichment("r-2");
    handled_complaint.is_complaint = Some(1);
    handled_complaint.has_response = Some(1);
    handled_complaint.has_constructive_response = Some(1);
    handled_complaint.facility = Some(1);
    handled_complaint.affordability = Some(3);
    handled_complaint.recommendation = Some(1);

    StoreSnapshot {
        establishments: vec![
            establishment("c-1", "Alpha Clinic"),
            establishment("c-2", "Beta Clinic"),
            establishment("c-3", "Gamma Clinic"),
        ],
        reviews: vec![
            review("r-1", "c-1", 5.0),
            review("r-2", "c-1", 4.0),
            review("r-3", "c-1", 3.0),
            review("r-4", "c-2", 5.0),
            review("r-5", "c-2", 4.0),
        ],
        enrichments: vec![praise, handled_complaint],
    }
}
