use campus_common::{Collection, Faculty, News, Program};
use chrono::Utc;
use tracing::info;

use crate::{DocumentStore, StoreError};

/// Documents inserted by one seeding run, per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub faculty: usize,
    pub program: usize,
    pub news: usize,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.faculty + self.program + self.news
    }
}

/// Fills empty content collections with demo records.
///
/// The emptiness check and the inserts are separate store calls. Two runs
/// racing on an empty store can both insert, leaving duplicate samples.
///
/// # Errors
/// Propagates the first store failure; collections seeded before it stay seeded.
pub async fn seed_samples(
    store: &DocumentStore,
    include_samples: bool,
) -> Result<SeedReport, StoreError> {
    let mut report = SeedReport::default();

    if !store.has_documents(Collection::Faculty).await? && include_samples {
        for faculty in sample_faculties() {
            store.insert(&faculty).await?;
            report.faculty += 1;
        }
    }

    if !store.has_documents(Collection::Program).await? && include_samples {
        for program in sample_programs() {
            store.insert(&program).await?;
            report.program += 1;
        }
    }

    if !store.has_documents(Collection::News).await? && include_samples {
        for news in sample_news() {
            store.insert(&news).await?;
            report.news += 1;
        }
    }

    info!(
        faculty = report.faculty,
        program = report.program,
        news = report.news,
        "seeding finished"
    );

    Ok(report)
}

fn sample_faculties() -> [Faculty; 2] {
    [
        Faculty {
            name: "Faculty of Engineering".to_owned(),
            description: Some("Leading innovation and technology.".to_owned()),
            dean: Some("Dr. Andi".to_owned()),
            website: Some("#".to_owned()),
            featured_image: Some(
                "https://images.unsplash.com/photo-1524178232363-1fb2b075b655?w=1200".to_owned(),
            ),
        },
        Faculty {
            name: "Faculty of Business".to_owned(),
            description: Some("Entrepreneurship and leadership.".to_owned()),
            dean: Some("Dr. Sari".to_owned()),
            website: Some("#".to_owned()),
            featured_image: Some(
                "https://images.unsplash.com/photo-1523050854058-8df90110c9f1?w=1200".to_owned(),
            ),
        },
    ]
}

fn sample_programs() -> [Program; 2] {
    [
        Program {
            title: "Computer Science (BSc)".to_owned(),
            level: "Undergraduate".to_owned(),
            faculty_id: None,
            duration_years: Some(4),
            overview: Some("Learn algorithms, AI, and software engineering.".to_owned()),
        },
        Program {
            title: "Business Administration (BBA)".to_owned(),
            level: "Undergraduate".to_owned(),
            faculty_id: None,
            duration_years: Some(4),
            overview: Some("Management, finance, and marketing foundations.".to_owned()),
        },
    ]
}

fn sample_news() -> [News; 1] {
    [News {
        title: "Campus Innovation Week 2025".to_owned(),
        content: "Join workshops, talks, and hackathons across campus.".to_owned(),
        author: Some("PR Team".to_owned()),
        published_at: Some(Utc::now()),
        cover_image: Some(
            "https://images.unsplash.com/photo-1523580846011-d3a5bc25702b?w=1200".to_owned(),
        ),
    }]
}
