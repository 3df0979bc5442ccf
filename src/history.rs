pub const SHIP_IMAGE_URL: &str = "https://upload.wikimedia.org/wikipedia/commons/f/fd/RMS_Titanic_3.jpg";
pub const FILM_POSTER_URL: &str = "https://pics.filmaffinity.com/Titanic-733113285-large.jpg";
pub const FILM_VIDEO_URL: &str = "https://www.youtube.com/watch?v=9bFHsd3o1w0";

pub const SHIP_HISTORY: &str = "\
The RMS Titanic was a British ocean liner that sank in the early hours of 15 April 1912, \
after striking an iceberg on her maiden voyage from Southampton to New York.

- Built in Belfast, Northern Ireland.
- Carried more than 2,200 passengers and crew.
- Lifeboats were available for only about half of those on board.
- More than 1,500 people died, making it one of the deadliest maritime disasters in history.

This tool uses historical data and a predictive model to estimate whether a passenger \
would have survived, based on a few of their characteristics.";

pub const FILM_HISTORY: &str = "\
In 1997 director James Cameron released Titanic, starring Leonardo DiCaprio and Kate Winslet.

- It won 11 Academy Awards, including Best Picture and Best Director.
- It blends historical events with a fictional love story between Jack and Rose.
- It became one of the highest-grossing films of all time.
- It is remembered for its visual effects, the reconstruction of the ship and its theme song \
\"My Heart Will Go On\" by Celine Dion.";

/// The informational page, as plain text
pub fn render() -> String {
    format!(
        "History of the RMS Titanic\n\n{}\n\nImage: {}\n\nThe Titanic at the movies\n\n{}\n\nPoster: {}\nTrailer: {}",
        SHIP_HISTORY, SHIP_IMAGE_URL, FILM_HISTORY, FILM_POSTER_URL, FILM_VIDEO_URL
    )
}
