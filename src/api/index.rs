use axum::Json;
use serde_json::{json, Value};
use std::sync::OnceLock;

/// Static JSON response for the index endpoint
static INDEX_JSON: OnceLock<Value> = OnceLock::new();

/// Handler for the index endpoint that provides API documentation
///
/// # Endpoint: GET /
///
/// # Returns
/// * `Json<Value>` - JSON response containing API endpoint documentation
pub fn index() -> Json<Value> {
    let value = INDEX_JSON.get_or_init(|| {
        json!({
            "endpoints": [
                {
                    "path": "/",
                    "method": "GET",
                    "description": "API endpoint documentation",
                    "params": {}
                },
                {
                    "path": "/api/auth/register",
                    "method": "POST",
                    "description": "Create a student account and receive an access token",
                    "params": {
                        "username": {
                            "type": "string",
                            "required": true,
                            "description": "3-32 characters, letters, digits and underscores"
                        },
                        "email": {
                            "type": "string",
                            "required": true,
                            "description": "Unique email address"
                        },
                        "password": {
                            "type": "string",
                            "required": true,
                            "description": "8-72 characters"
                        }
                    }
                },
                {
                    "path": "/api/auth/login",
                    "method": "POST",
                    "description": "Exchange credentials for an access token",
                    "params": {
                        "email": {
                            "type": "string",
                            "required": true,
                            "description": "Account email"
                        },
                        "password": {
                            "type": "string",
                            "required": true,
                            "description": "Account password"
                        }
                    }
                },
                {
                    "path": "/api/auth/me",
                    "method": "GET",
                    "description": "The authenticated caller's profile",
                    "params": {}
                },
                {
                    "path": "/api/categories",
                    "method": "GET",
                    "description": "List exam categories",
                    "params": {}
                },
                {
                    "path": "/api/categories/:id",
                    "method": "GET",
                    "description": "Fetch one exam category",
                    "params": {
                        "id": {
                            "type": "string",
                            "required": true,
                            "description": "Category identifier"
                        }
                    }
                },
                {
                    "path": "/api/exams",
                    "method": "GET",
                    "description": "List published exams, optionally filtered by category",
                    "params": {
                        "category": {
                            "type": "string",
                            "required": false,
                            "description": "Category identifier to filter by"
                        }
                    }
                },
                {
                    "path": "/api/exams/:id",
                    "method": "GET",
                    "description": "Exam detail with its questions (correct answers withheld)",
                    "params": {
                        "id": {
                            "type": "string",
                            "required": true,
                            "description": "Exam identifier"
                        }
                    }
                },
                {
                    "path": "/api/exams/:id/attempts",
                    "method": "POST",
                    "description": "Start a timed attempt; the deadline is fixed server-side",
                    "params": {
                        "id": {
                            "type": "string",
                            "required": true,
                            "description": "Exam identifier"
                        }
                    }
                },
                {
                    "path": "/api/attempts/:id",
                    "method": "GET",
                    "description": "Attempt detail; per-question results once finalized",
                    "params": {
                        "id": {
                            "type": "string",
                            "required": true,
                            "description": "Attempt identifier"
                        }
                    }
                },
                {
                    "path": "/api/attempts/:id/answers",
                    "method": "PUT",
                    "description": "Record or replace one answer on a running attempt",
                    "params": {
                        "question_id": {
                            "type": "string",
                            "required": true,
                            "description": "Question being answered"
                        },
                        "selected_option": {
                            "type": "integer",
                            "required": true,
                            "description": "Zero-based index of the chosen option"
                        }
                    }
                },
                {
                    "path": "/api/attempts/:id/submit",
                    "method": "POST",
                    "description": "Finalize a running attempt and return its results",
                    "params": {
                        "id": {
                            "type": "string",
                            "required": true,
                            "description": "Attempt identifier"
                        }
                    }
                },
                {
                    "path": "/api/progress",
                    "method": "GET",
                    "description": "Per-subject accuracy and time statistics for the caller",
                    "params": {}
                },
                {
                    "path": "/api/user/attempts",
                    "method": "GET",
                    "description": "The caller's attempt history",
                    "params": {}
                },
                {
                    "path": "/api/exam-manager/exams",
                    "method": "POST",
                    "description": "Create an exam (exam manager or admin)",
                    "params": {
                        "title": {
                            "type": "string",
                            "required": true,
                            "description": "Exam title"
                        },
                        "category_id": {
                            "type": "string",
                            "required": true,
                            "description": "Existing category identifier"
                        },
                        "description": {
                            "type": "string",
                            "required": false,
                            "description": "Free-form description"
                        },
                        "duration_minutes": {
                            "type": "integer",
                            "required": true,
                            "description": "Attempt time limit"
                        },
                        "pass_percentage": {
                            "type": "integer",
                            "required": true,
                            "description": "Pass mark, 0-100"
                        },
                        "is_published": {
                            "type": "boolean",
                            "required": false,
                            "description": "Visibility to students"
                        }
                    }
                },
                {
                    "path": "/api/exam-manager/exams/:id",
                    "method": "PUT | DELETE",
                    "description": "Update or delete an exam (exam manager or admin)",
                    "params": {
                        "$ref": "#/endpoints/14/params"
                    }
                },
                {
                    "path": "/api/exam-manager/exams/:id/questions",
                    "method": "POST",
                    "description": "Add a question to an exam (exam manager or admin)",
                    "params": {
                        "subject": {
                            "type": "string",
                            "required": true,
                            "description": "Subject used for progress aggregation"
                        },
                        "prompt": {
                            "type": "string",
                            "required": true,
                            "description": "Question text"
                        },
                        "options": {
                            "type": "array",
                            "items": "string",
                            "required": true,
                            "description": "At least two answer options"
                        },
                        "correct_option": {
                            "type": "integer",
                            "required": true,
                            "description": "Zero-based index of the correct option"
                        },
                        "marks": {
                            "type": "integer",
                            "required": true,
                            "description": "Marks awarded for a correct answer"
                        }
                    }
                },
                {
                    "path": "/api/exam-manager/questions/:id",
                    "method": "PUT | DELETE",
                    "description": "Update or delete a question (exam manager or admin)",
                    "params": {
                        "$ref": "#/endpoints/16/params"
                    }
                },
                {
                    "path": "/api/admin/users",
                    "method": "GET",
                    "description": "Paginated user listing (admin)",
                    "params": {
                        "page": {
                            "type": "integer",
                            "required": false,
                            "description": "Page number (starting from 1)"
                        }
                    }
                },
                {
                    "path": "/api/admin/users/:id/role",
                    "method": "PUT",
                    "description": "Change a user's role (admin)",
                    "params": {
                        "role": {
                            "type": "string",
                            "required": true,
                            "description": "One of student, exam_manager, admin"
                        }
                    }
                },
                {
                    "path": "/api/admin/users/:id",
                    "method": "DELETE",
                    "description": "Delete a user account (admin)",
                    "params": {}
                },
                {
                    "path": "/api/admin/categories",
                    "method": "POST",
                    "description": "Create an exam category (admin)",
                    "params": {
                        "name": {
                            "type": "string",
                            "required": true,
                            "description": "Unique category name"
                        },
                        "description": {
                            "type": "string",
                            "required": false,
                            "description": "Free-form description"
                        }
                    }
                },
                {
                    "path": "/api/admin/categories/:id",
                    "method": "PUT | DELETE",
                    "description": "Update or delete an exam category (admin)",
                    "params": {
                        "$ref": "#/endpoints/21/params"
                    }
                },
                {
                    "path": "/health",
                    "method": "GET",
                    "description": "Service health including background job status",
                    "params": {}
                },
            ]
        })
    });

    Json(value.clone())
}
