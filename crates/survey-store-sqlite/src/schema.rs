//! SQL schema for the survey SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Reference data, provisioned out-of-band.
CREATE TABLE IF NOT EXISTS countries (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    code        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
);

CREATE TABLE IF NOT EXISTS companies (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    country_id  INTEGER NOT NULL REFERENCES countries(id),
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
);

CREATE TABLE IF NOT EXISTS locations (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    address     TEXT,
    company_id  INTEGER NOT NULL REFERENCES companies(id),
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
);

CREATE TABLE IF NOT EXISTS surveys (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    description TEXT,
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
);

CREATE TABLE IF NOT EXISTS questions (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    survey_id     INTEGER NOT NULL REFERENCES surveys(id),
    question_text TEXT NOT NULL,
    question_type TEXT NOT NULL
                  CHECK (question_type IN ('rating', 'text', 'yes_no', 'multiple_choice')),
    options       TEXT,            -- JSON payload or NULL
    order_index   INTEGER NOT NULL,
    is_required   INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
    UNIQUE (survey_id, order_index)
);

-- Responses and answers are strictly append-only.
-- No UPDATE or DELETE is ever issued against these tables.
CREATE TABLE IF NOT EXISTS survey_responses (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    survey_id           INTEGER NOT NULL REFERENCES surveys(id),
    country_id          INTEGER NOT NULL REFERENCES countries(id),
    company_id          INTEGER NOT NULL REFERENCES companies(id),
    location_id         INTEGER NOT NULL REFERENCES locations(id),
    submitted_at        TEXT NOT NULL,   -- RFC 3339 UTC, fixed width; server-assigned
    idempotency_key     TEXT UNIQUE,     -- client-supplied UUID or NULL
    payload_fingerprint TEXT,            -- SHA-256 hex, set iff idempotency_key is
    CHECK ((idempotency_key IS NULL) = (payload_fingerprint IS NULL))
);

CREATE TABLE IF NOT EXISTS answers (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    response_id   INTEGER NOT NULL REFERENCES survey_responses(id),
    question_id   INTEGER NOT NULL REFERENCES questions(id),
    answer_value  TEXT NOT NULL,
    UNIQUE (response_id, question_id)
);

CREATE INDEX IF NOT EXISTS companies_country_idx  ON companies(country_id);
CREATE INDEX IF NOT EXISTS locations_company_idx  ON locations(company_id);
CREATE INDEX IF NOT EXISTS responses_survey_idx   ON survey_responses(survey_id);
CREATE INDEX IF NOT EXISTS responses_company_idx  ON survey_responses(company_id);
CREATE INDEX IF NOT EXISTS responses_order_idx    ON survey_responses(submitted_at, id);
CREATE INDEX IF NOT EXISTS answers_question_idx   ON answers(question_id);

PRAGMA user_version = 1;
";

/// Sample reference data and one satisfaction survey, for demos and local
/// development. Applied only to an empty database.
pub const DEMO_DATA: &str = "
INSERT INTO countries (name, code) VALUES
    ('Guatemala',   'GT'),
    ('El Salvador', 'SV'),
    ('Honduras',    'HN'),
    ('México',      'MX'),
    ('Costa Rica',  'CR');

INSERT INTO companies (name, country_id) VALUES
    ('CarWash Express GT',  1),
    ('AutoLimpio',          1),
    ('Lavado Premium',      2),
    ('Clean Car Services',  4);

INSERT INTO locations (name, address, company_id) VALUES
    ('Zona 10',                 'Boulevard Los Próceres, Zona 10', 1),
    ('Zona 4',                  'Avenida Petapa, Zona 4',          1),
    ('Carretera a El Salvador', 'Km 15.5 Carretera a El Salvador', 2),
    ('San Salvador Centro',     'Col. Escalón, San Salvador',      3),
    ('Ciudad de México - Roma', 'Col. Roma Norte, CDMX',           4);

INSERT INTO surveys (title, description) VALUES
    ('Encuesta de Satisfacción - Servicio de Lavado',
     'Queremos conocer tu opinión sobre el servicio recibido');

INSERT INTO questions (survey_id, question_text, question_type, options, order_index, is_required) VALUES
    (1, '¿Cómo calificarías la calidad del lavado?',          'rating', '{\"min\":1,\"max\":5}', 1, 1),
    (1, '¿El personal fue amable y profesional?',             'yes_no', NULL,                  2, 1),
    (1, '¿Qué tan satisfecho estás con el tiempo de espera?', 'rating', '{\"min\":1,\"max\":5}', 3, 1),
    (1, '¿Recomendarías nuestro servicio?',                   'yes_no', NULL,                  4, 1),
    (1, 'Comentarios adicionales (opcional)',                 'text',   NULL,                  5, 0);
";
