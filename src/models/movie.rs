use serde::{Deserialize, Serialize};

/// Number of billed cast members kept from the credits payload
const TOP_BILLED: usize = 10;

/// Full record for a single movie, from `/movie/{id}?append_to_response=credits`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// Raw TMDB movie payload with credits appended
#[derive(Debug, Deserialize)]
pub struct ApiMovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub credits: Option<ApiCredits>,
}

#[derive(Debug, Deserialize)]
pub struct ApiCredits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

impl From<ApiMovieDetails> for MovieDetails {
    fn from(api: ApiMovieDetails) -> Self {
        let cast = api
            .credits
            .map(|credits| credits.cast.into_iter().take(TOP_BILLED).collect())
            .unwrap_or_default();

        MovieDetails {
            id: api.id,
            title: api.title,
            tagline: api.tagline.filter(|t| !t.is_empty()),
            overview: api.overview,
            poster_path: api.poster_path,
            backdrop_path: api.backdrop_path,
            release_date: api.release_date,
            runtime: api.runtime,
            vote_average: api.vote_average,
            genres: api.genres,
            cast,
        }
    }
}
