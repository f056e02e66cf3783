use sqlx::types::Json;

use crate::{
    db::{id_prefix, new_id, timestamp, Database},
    error::Result,
};

struct Showcase {
    title: &'static str,
    category: &'static str,
    short_description: &'static str,
    full_description: &'static str,
    background_story: &'static str,
    usage_instructions: &'static str,
    image: &'static str,
    external_link: &'static str,
    tags: &'static [&'static str],
    likes_count: i64,
}

const SHOWCASE: [Showcase; 3] = [
    Showcase {
        title: "I Ching Divination",
        category: "AI Tool",
        short_description: "An AI divination app that pairs the I Ching with modern language models.",
        full_description: "Casts a hexagram from the sixty-four of the Book of Changes, then \
            explains the reading and offers guidance tailored to the question you asked.",
        background_story: "I wanted to bring an old body of wisdom and current AI tooling \
            together, and to learn how to build an AI-driven app along the way.",
        usage_instructions: "1. Open the app and focus on your question\n\
            2. Press \"Start\" to cast the hexagram\n\
            3. Read the generated hexagram and its interpretation\n\
            4. Review the suggested next steps",
        image: "https://images.unsplash.com/photo-1518709268805-4e9042af9f23",
        external_link: "http://223.109.142.31:8866",
        tags: &["AI", "I Ching", "Culture", "Web App"],
        likes_count: 88,
    },
    Showcase {
        title: "Novel Reader",
        category: "Web App",
        short_description: "A clean online novel reader focused on a smooth reading experience.",
        full_description: "Supports several reading modes, adjustable fonts and saved progress, \
            with a minimal interface that keeps the story in front.",
        background_story: "Most reading sites are full of ads and clutter. I wanted one that \
            only does reading, and does it well.",
        usage_instructions: "1. Open the reader\n\
            2. Browse or search for a novel\n\
            3. Start reading\n\
            4. Adjust font size and background in the settings\n\
            5. Progress is saved automatically",
        image: "https://images.unsplash.com/photo-1512820790803-83ca734da794",
        external_link: "http://223.109.142.31:8081/",
        tags: &["Reading", "Novels", "Web App", "UX"],
        likes_count: 0,
    },
    Showcase {
        title: "Xishuangbanna Travel Assistant",
        category: "AI Tool",
        short_description: "An AI trip planner for in-depth travel around Xishuangbanna.",
        full_description: "Plans an itinerary from your interests, time and budget, and adds \
            sights, food and transport tips through a conversational interface.",
        background_story: "Many visitors miss what makes Xishuangbanna special. This assistant \
            aims to let everyone explore it like a local.",
        usage_instructions: "1. Tell the assistant your dates, budget and interests\n\
            2. Review the generated itinerary\n\
            3. Browse sights and food recommendations\n\
            4. Get transport and lodging advice\n\
            5. Keep chatting to adjust the plan",
        image: "https://images.unsplash.com/photo-1552733407-5d5c46c3bb3b",
        external_link: "http://223.109.142.31:8088/",
        tags: &["AI", "Travel", "Xishuangbanna", "Recommendations"],
        likes_count: 0,
    },
];

/// Inserts the showcase projects into an empty catalogue. Returns how many
/// rows were written; zero when projects already exist.
pub async fn seed_projects(db: &Database) -> Result<usize> {
    let mut tx = db.pool.begin().await?;
    let mut inserted = 0;

    for showcase in &SHOWCASE {
        let now = timestamp();
        let tags: Vec<String> = showcase.tags.iter().map(|t| t.to_string()).collect();

        // The first row only lands on an empty table; later rows follow it.
        let guard = if inserted == 0 {
            "WHERE NOT EXISTS (SELECT 1 FROM projects)"
        } else {
            ""
        };
        let sql = format!(
            "INSERT INTO projects (id, title, category, short_description, full_description, \
             background_story, usage_instructions, thumbnail_url, banner_url, external_link, \
             tags, likes_count, comments_count, created_at, updated_at) \
             SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ? {guard}"
        );

        let rows = sqlx::query(&sql)
            .bind(new_id(id_prefix::PROJECT))
            .bind(showcase.title)
            .bind(showcase.category)
            .bind(showcase.short_description)
            .bind(showcase.full_description)
            .bind(showcase.background_story)
            .bind(showcase.usage_instructions)
            .bind(format!("{}?auto=format&fit=crop&q=80&w=800", showcase.image))
            .bind(format!("{}?auto=format&fit=crop&q=80&w=1200", showcase.image))
            .bind(showcase.external_link)
            .bind(Json(tags))
            .bind(showcase.likes_count)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if rows == 0 {
            tracing::debug!("projects already present; skipping showcase seed");
            return Ok(0);
        }
        inserted += 1;
    }

    tx.commit().await?;

    tracing::info!(count = inserted, "seeded showcase projects");
    Ok(inserted)
}
