//! Example records written on first start when no snapshot exists.
//! Content is illustrative; timestamps are relative to the given `now`.

use chrono::{DateTime, Duration, Utc};

use civic_types::models::{
    Complaint, ComplaintComment, ComplaintStatus, Discussion, DiscussionComment, Likes, Role,
};

fn days_ago(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

fn liked_by(ids: &[&str]) -> Likes {
    ids.iter().copied().collect()
}

pub fn complaints(now: DateTime<Utc>) -> Vec<Complaint> {
    vec![
        Complaint {
            id: "c1".into(),
            title: "Poor road conditions in North District".into(),
            description: "The roads in North District have been in bad condition for months. \
                          Multiple potholes cause damage to vehicles."
                .into(),
            category: "Infrastructure".into(),
            location: "North District".into(),
            status: ComplaintStatus::Pending,
            created_at: days_ago(now, 7),
            updated_at: days_ago(now, 7),
            author_id: "u1".into(),
            author_name: "John Citizen".into(),
            comments: vec![],
        },
        Complaint {
            id: "c2".into(),
            title: "Garbage collection issues in Central Area".into(),
            description: "Garbage hasn't been collected in Central Area for two weeks now. \
                          This is causing health hazards."
                .into(),
            category: "Sanitation".into(),
            location: "Central Area".into(),
            status: ComplaintStatus::Reviewing,
            created_at: days_ago(now, 14),
            updated_at: days_ago(now, 10),
            author_id: "u2".into(),
            author_name: "Sarah Voter".into(),
            comments: vec![ComplaintComment {
                id: "cmt1".into(),
                text: "I'll look into this issue immediately.".into(),
                created_at: days_ago(now, 10),
                author_id: "m1".into(),
                author_name: "MLA Representative".into(),
                author_role: Role::Mla,
            }],
        },
        Complaint {
            id: "c3".into(),
            title: "Water supply interrupted in East Zone".into(),
            description: "We've had no water supply in East Zone for 3 days. \
                          This is causing severe difficulties for residents."
                .into(),
            category: "Utilities".into(),
            location: "East Zone".into(),
            status: ComplaintStatus::Escalated,
            created_at: days_ago(now, 5),
            updated_at: days_ago(now, 2),
            author_id: "u3".into(),
            author_name: "David Constituent".into(),
            comments: vec![
                ComplaintComment {
                    id: "cmt2".into(),
                    text: "This issue requires immediate attention. \
                           I'm escalating to district authorities."
                        .into(),
                    created_at: days_ago(now, 3),
                    author_id: "m1".into(),
                    author_name: "MLA Representative".into(),
                    author_role: Role::Mla,
                },
                ComplaintComment {
                    id: "cmt3".into(),
                    text: "District authority will send engineers to inspect the issue tomorrow."
                        .into(),
                    created_at: days_ago(now, 2),
                    author_id: "d1".into(),
                    author_name: "District Officer".into(),
                    author_role: Role::District,
                },
            ],
        },
    ]
}

pub fn discussions(now: DateTime<Utc>) -> Vec<Discussion> {
    vec![
        Discussion {
            id: "d1".into(),
            title: "New park proposal for city center".into(),
            content: "I believe our community needs a new park in the city center. \
                      It would provide a great space for families and children."
                .into(),
            category: "Parks & Recreation".into(),
            created_at: days_ago(now, 30),
            updated_at: days_ago(now, 25),
            author_id: "u1".into(),
            author_name: "John Citizen".into(),
            comments: vec![
                DiscussionComment {
                    id: "dcmt1".into(),
                    text: "I strongly support this idea! Our community needs more green spaces."
                        .into(),
                    created_at: days_ago(now, 28),
                    author_id: "u2".into(),
                    author_name: "Sarah Voter".into(),
                    author_role: Role::Voter,
                    likes: liked_by(&["u3", "u4", "m1", "d1", "u6"]),
                },
                DiscussionComment {
                    id: "dcmt2".into(),
                    text: "This is a good proposal. I'll discuss this with the relevant \
                           department in our next meeting."
                        .into(),
                    created_at: days_ago(now, 25),
                    author_id: "m1".into(),
                    author_name: "MLA Representative".into(),
                    author_role: Role::Mla,
                    likes: liked_by(&[
                        "u1", "u2", "u3", "u4", "u5", "u6", "u7", "u8", "u9", "u10", "u11", "u12",
                    ]),
                },
            ],
            likes: liked_by(&[
                "u2", "u3", "u4", "u5", "u6", "u7", "u8", "u9", "u10", "u11", "u12", "u13", "u14",
                "u15", "u16", "u17", "u18", "u19", "u20", "u21", "u22", "m1", "d1", "c1",
            ]),
        },
        Discussion {
            id: "d2".into(),
            title: "Improving public transportation".into(),
            content: "We need more bus routes connecting the suburban areas to the city center. \
                      Current options are limited and overcrowded."
                .into(),
            category: "Transportation".into(),
            created_at: days_ago(now, 15),
            updated_at: days_ago(now, 15),
            author_id: "u3".into(),
            author_name: "David Constituent".into(),
            comments: vec![],
            likes: liked_by(&["u1", "u2", "u4", "u5", "u6", "u7", "u8", "m1"]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_types::models::Likeable;

    #[test]
    fn seed_records_respect_entity_invariants() {
        let now = Utc::now();
        for complaint in complaints(now) {
            assert!(complaint.updated_at >= complaint.created_at, "{}", complaint.id);
        }
        let discussions = discussions(now);
        assert_eq!(discussions[0].like_count(), 24);
        assert_eq!(discussions[0].comments[1].like_count(), 12);
        assert_eq!(discussions[1].like_count(), 8);
    }
}
